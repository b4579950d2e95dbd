//! Documentation content for the sift CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Paths,
    Operators,
    Methods,
    Sequences,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "syntax" => Some(Self::Syntax),
            "paths" | "path" | "fields" => Some(Self::Paths),
            "operators" | "ops" | "keywords" => Some(Self::Operators),
            "methods" | "method" => Some(Self::Methods),
            "sequences" | "sequence" | "broadcasting" => Some(Self::Sequences),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"SIFT DOCUMENTATION

Sift is a small query language for filtering collections of nested records,
such as dictionary entries. A query is a boolean expression evaluated once
per record; records for which it is truthy are kept.

DOCUMENTATION CATEGORIES

  syntax       Tokens, quoting, literals and parentheses
  paths        Field paths and the special segments $ANY, $SELF, d_$N
  operators    Comparison and logic operators, the 'in' keyword
  methods      len, split, any, all, lower, upper, reduce, print
  sequences    Broadcasting, truthiness and how sequence results match

QUICK REFERENCE

  meaning                   Field of the record
  pos[noun][data]           Nested field
  senses[d_$0]              First item of a sequence
  pos[$ANY][data]           Fan out over every part of speech
  "^to " in meaning         Regex search
  len(senses) > 1           Method call and comparison
  not a and b or c          Logic (not > comparisons > and > or)

Run 'sift doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Paths) => Ok(PATHS_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Methods) => Ok(METHODS_DOC),
        Some(DocCategory::Sequences) => Ok(SEQUENCES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Tokens and Literals

TOKENS
  Whitespace separates tokens. Parentheses are always tokens of their own,
  so 'len(x)' and 'len ( x )' are the same query.

  A token's meaning depends on the token before it:
    not       logic operator at the start or after an operator/'(' ,
              a field name anywhere else
    and, or   logic operators after a value or ')'
    in        keyword after a value

QUOTING
  "some text"
    Double quotes keep spaces and parentheses inside one token.
    \" inside a quoted token is a literal quote; other escapes are kept
    as written (handy for regex patterns).

    Example:
      Query:  "^to \w+" in meaning

NUMBERS
  3    -2    0.5    .5    -1.
    A token that looks like a decimal number is a number.

  f_$3
    The f_$ prefix forces a field path: 'f_$3' is the field named 3.

PARENTHESES
  (a or b) and c
    Group sub-expressions. Every '(' must be closed.

    Example:
      Query:  ((field
      Error:  syntax error: unbalanced parentheses: '(' is never closed
"#;

const PATHS_DOC: &str = r#"PATHS - Reaching into Records

FIELD ACCESS
  meaning
  pos[noun][data]
    A bare word is a field of the record; brackets descend into nested
    mappings. Missing fields are not errors: the record simply has no
    value there.

    Example:
      Input:  {"pos": {"noun": {"data": 1}}}
      Query:  pos[noun][data] == 1
      Output: true

    A path that ends on a mapping yields its keys.

NUMERIC SEGMENTS
  senses[d_$0]
  senses[d_$-1]
    d_$N indexes a sequence (negative counts from the end) or looks up a
    numeric key in a mapping.

WILDCARD
  pos[$ANY][data]
    $ANY fans out over every value at that level. Branches that come up
    empty are dropped. One surviving branch gives its value as is; more
    than one give a list.

    Example:
      Input:  {"pos": {"noun": {"data": 1}, "verb": {"data": 2}}}
      Query:  pos[$ANY][data]
      Output: [1, 2]

SELF
  $SELF
  pos[$SELF]
    The key set of the current level (indices for a sequence).

    Example:
      Input:  {"field_1": 1, "field_2": 2}
      Query:  $SELF
      Output: ["field_1", "field_2"]
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparison, Logic and Keywords

COMPARISON OPERATORS
  ==  !=  <  >  <=  >=

  Examples:
    len(senses) >= 2
    pos[noun][data] != 0

  Constraints:
    - Numbers compare by value (1 == 1.0)
    - Strings compare lexicographically
    - Ordering anything else is an argument type error

LOGIC OPERATORS
  not    prefix, binds tightest
  and
  or     binds loosest

  Examples:
    not archaic and len(forms) > 1
    not not x                       same as x

  Precedence:  not, then comparisons, then and, then or.
  Operators of one level group left to right.

KEYWORDS
  PATTERN in FIELD
    True when the regular expression PATTERN matches anywhere in FIELD.
    FIELD may be a string or a sequence of strings (any item matching is
    enough). A missing field never matches.

    Example:
      Input:  {"field": ["1", "2", "3"]}
      Query:  1 in field
      Output: true
"#;

const METHODS_DOC: &str = r#"METHODS - Built-in Functions

Every method takes exactly one argument: name(expression).

len(x)
    Length of a string, sequence or mapping. 0 for anything else.

split(x)
    Split a string on whitespace. On a sequence, splits every item.
    Anything that is not a string is an argument type error.

    Example:
      Query:  len(split(meaning)) > 3

lower(x)  upper(x)
    Change the case of a string, or of every string in a sequence.

any(x)  all(x)
    Whether any / all items of a sequence are truthy.

reduce(x)
    Flatten one level of nesting.

    Example:
      Input:  {"pos": {"noun": ["a", "b"], "verb": ["c"]}}
      Query:  reduce(pos[$ANY])
      Output: ["a", "b", "c"]

print(x)
    Stop the query and report the value of x. Useful while writing a
    query: 'sift check "print(pos[$ANY][data])" --input ...'
"#;

const SEQUENCES_DOC: &str = r#"SEQUENCES - Broadcasting and Matching

BROADCASTING
  When one side of an operator is a sequence, the operator is applied to
  every item:

    Input:  {"pos": {"noun": {"data": 1}, "verb": {"data": 2}}}
    Query:  pos[$ANY][data] > 1
    Output: [false, true]

  Two sequences combine every left item with every right item.

  'not' applies to every item of a sequence.

TRUTHINESS
  Falsy:   null, false, 0, "", empty sequences and mappings
  Truthy:  everything else

MATCHING
  A record is kept when the query's result is truthy. A sequence result
  keeps the record when any of its items does, so the query above keeps
  the record because the verb's data is greater than 1.

ERRORS
  By default the first record that fails to evaluate stops the run.
  Pass --skip-errors to leave such records out instead.
"#;
