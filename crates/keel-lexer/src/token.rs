use keel_ast::Span;
use std::fmt;

/// Token kinds. Only ECMAScript reserved words are lexed as keywords; the
/// TypeScript contextual words (`type`, `declare`, `readonly`, ...) arrive
/// as identifiers and are recognised by the parser where they matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
    Let,
    Yield,
    Await,

    // Literals
    NumberLiteral,
    StringLiteral,
    RegexLiteral,
    /// `` `text` ``
    NoSubstitutionTemplate,
    /// `` `text${ ``
    TemplateHead,
    /// `}text${`
    TemplateMiddle,
    /// `` }text` ``
    TemplateTail,

    Identifier,

    // Operators
    Plus,               // +
    Minus,              // -
    Star,               // *
    Slash,              // /
    Percent,            // %
    StarStar,           // **
    Eq,                 // =
    EqEq,               // ==
    EqEqEq,             // ===
    BangEq,             // !=
    BangEqEq,           // !==
    Lt,                 // <
    Gt,                 // >
    LtEq,               // <=
    GtEq,               // >=
    AmpAmp,             // &&
    PipePipe,           // ||
    Bang,               // !
    Amp,                // &
    Pipe,               // |
    Caret,              // ^
    Tilde,              // ~
    LtLt,               // <<
    GtGt,               // >>
    GtGtGt,             // >>>
    PlusEq,             // +=
    MinusEq,            // -=
    StarEq,             // *=
    SlashEq,            // /=
    PercentEq,          // %=
    StarStarEq,         // **=
    AmpAmpEq,           // &&=
    PipePipeEq,         // ||=
    QuestionQuestionEq, // ??=
    LtLtEq,             // <<=
    GtGtEq,             // >>=
    GtGtGtEq,           // >>>=
    AmpEq,              // &=
    PipeEq,             // |=
    CaretEq,            // ^=
    QuestionQuestion,   // ??
    QuestionDot,        // ?.
    PlusPlus,           // ++
    MinusMinus,         // --
    FatArrow,           // =>
    DotDotDot,          // ...

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    Colon,     // :
    Question,  // ?
    At,        // @

    Eof,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match word {
            "break" => Break,
            "case" => Case,
            "catch" => Catch,
            "class" => Class,
            "const" => Const,
            "continue" => Continue,
            "debugger" => Debugger,
            "default" => Default,
            "delete" => Delete,
            "do" => Do,
            "else" => Else,
            "enum" => Enum,
            "export" => Export,
            "extends" => Extends,
            "false" => False,
            "finally" => Finally,
            "for" => For,
            "function" => Function,
            "if" => If,
            "import" => Import,
            "in" => In,
            "instanceof" => Instanceof,
            "new" => New,
            "null" => Null,
            "return" => Return,
            "super" => Super,
            "switch" => Switch,
            "this" => This,
            "throw" => Throw,
            "true" => True,
            "try" => Try,
            "typeof" => Typeof,
            "var" => Var,
            "void" => Void,
            "while" => While,
            "with" => With,
            "let" => Let,
            "yield" => Yield,
            "await" => Await,
            _ => return None,
        })
    }

    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Break | Case | Catch | Class | Const | Continue | Debugger | Default | Delete | Do
                | Else | Enum | Export | Extends | False | Finally | For | Function | If
                | Import | In | Instanceof | New | Null | Return | Super | Switch | This
                | Throw | True | Try | Typeof | Var | Void | While | With | Let | Yield | Await
        )
    }

    /// Whether a `/` after this token starts a regular expression rather
    /// than a division.
    pub(crate) fn allows_regex_after(self) -> bool {
        use TokenKind::*;
        !matches!(
            self,
            Identifier
                | NumberLiteral
                | StringLiteral
                | RegexLiteral
                | NoSubstitutionTemplate
                | TemplateTail
                | RParen
                | RBracket
                | RBrace
                | This
                | Super
                | True
                | False
                | Null
                | PlusPlus
                | MinusMinus
        )
    }

    /// Source spelling used in `'x' expected.` messages.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Break => "break",
            Case => "case",
            Catch => "catch",
            Class => "class",
            Const => "const",
            Continue => "continue",
            Debugger => "debugger",
            Default => "default",
            Delete => "delete",
            Do => "do",
            Else => "else",
            Enum => "enum",
            Export => "export",
            Extends => "extends",
            False => "false",
            Finally => "finally",
            For => "for",
            Function => "function",
            If => "if",
            Import => "import",
            In => "in",
            Instanceof => "instanceof",
            New => "new",
            Null => "null",
            Return => "return",
            Super => "super",
            Switch => "switch",
            This => "this",
            Throw => "throw",
            True => "true",
            Try => "try",
            Typeof => "typeof",
            Var => "var",
            Void => "void",
            While => "while",
            With => "with",
            Let => "let",
            Yield => "yield",
            Await => "await",
            NumberLiteral => "number",
            StringLiteral => "string",
            RegexLiteral => "regular expression",
            NoSubstitutionTemplate | TemplateHead | TemplateMiddle | TemplateTail => "template",
            Identifier => "identifier",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            StarStar => "**",
            Eq => "=",
            EqEq => "==",
            EqEqEq => "===",
            BangEq => "!=",
            BangEqEq => "!==",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            AmpAmp => "&&",
            PipePipe => "||",
            Bang => "!",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            LtLt => "<<",
            GtGt => ">>",
            GtGtGt => ">>>",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            StarStarEq => "**=",
            AmpAmpEq => "&&=",
            PipePipeEq => "||=",
            QuestionQuestionEq => "??=",
            LtLtEq => "<<=",
            GtGtEq => ">>=",
            GtGtGtEq => ">>>=",
            AmpEq => "&=",
            PipeEq => "|=",
            CaretEq => "^=",
            QuestionQuestion => "??",
            QuestionDot => "?.",
            PlusPlus => "++",
            MinusMinus => "--",
            FatArrow => "=>",
            DotDotDot => "...",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Colon => ":",
            Question => "?",
            At => "@",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its kind and span. `value` holds the cooked contents of
/// literals (escapes resolved, digits without separators); `text` is the
/// exact source slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
    pub text: String,
    /// A line terminator appears between the previous token and this one.
    pub preceded_by_newline: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String, text: String) -> Self {
        Self {
            kind,
            span,
            value,
            text,
            preceded_by_newline: false,
        }
    }

    /// Identifier or keyword spelled `word`.
    pub fn is_word(&self, word: &str) -> bool {
        (self.kind == TokenKind::Identifier || self.kind.is_keyword()) && self.text == word
    }
}

/// A lexical error with its TypeScript diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub code: u32,
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub(crate) fn new(code: u32, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{}: {}", self.code, self.message)
    }
}
