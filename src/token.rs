#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Valued tokens.
    Number(i64), Id(String), String(String), Char(char),

    // Keywords.
    Class, Return, If, Else, Def, Print,
    And, Or, Not, None, True, False,

    // Layout.
    Newline, Indent, Dedent, Eof,

    // Two-character operators.
    Eq, NotEq, LessOrEq, GreaterOrEq,
}
