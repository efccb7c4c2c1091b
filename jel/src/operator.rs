//! The fixed operator table
//!
//! Operators are a closed enum shared by the tokenizer, the parser and the
//! runtime dispatch. Precedence, the strict/lenient comparison families and
//! the reversal table all live here so that a change to any of them is
//! visibly a wire-format change.

use std::fmt;

/// Every operator and punctuation token of the language.
///
/// The word operators `map`/`filter`/... and the unary words `abs`/`count`/...
/// are not reserved at the tokenizer level; the parser recognizes them
/// positionally via [`Operator::from_infix_word`] and
/// [`Operator::from_unary_word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Assignment and equality
    Assign,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,

    // Ordering, lenient and strict
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    StrictLess,
    StrictGreater,
    StrictLessEqual,
    StrictGreaterEqual,

    // Logic
    And,
    Or,
    Not,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Negate,

    // Type tests
    InstanceOf,
    DerivativeOf,

    // Collection words (infix)
    Map,
    Filter,
    Collect,
    Sort,
    At,
    Skip,
    Truncate,

    // Unary words
    Abs,
    Count,
    Exists,
    Max,
    Min,
    Avg,
    Same,
    First,

    // Member access
    Dot,

    // Reserved keywords (tagged as operators by the tokenizer)
    If,
    Then,
    Else,
    With,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comma,
    Colon,
    AtSign,
    FatArrow,
}

impl Operator {
    /// Binding strength of a binary operator; higher binds tighter.
    /// Returns `None` for tokens that are not binary operators.
    pub fn precedence(self) -> Option<u8> {
        use Operator::*;
        let prec = match self {
            Or => 5,
            And => 6,
            Assign | Equal | NotEqual | StrictEqual | StrictNotEqual => 10,
            Less | Greater | LessEqual | GreaterEqual | StrictLess | StrictGreater
            | StrictLessEqual | StrictGreaterEqual => 11,
            Add | Subtract => 13,
            Multiply | Divide | Modulo => 14,
            InstanceOf | DerivativeOf | Map | Filter | Collect | Sort | At | Skip | Truncate => 16,
            Dot => 18,
            _ => return None,
        };
        Some(prec)
    }

    /// All unary operators bind at the same strength.
    pub const UNARY_PRECEDENCE: u8 = 16;

    /// Recognize a word that acts as a binary operator in operator position
    pub fn from_infix_word(word: &str) -> Option<Operator> {
        use Operator::*;
        match word {
            "map" => Some(Map),
            "filter" => Some(Filter),
            "collect" => Some(Collect),
            "sort" => Some(Sort),
            "at" => Some(At),
            "skip" => Some(Skip),
            "truncate" => Some(Truncate),
            _ => None,
        }
    }

    /// Recognize a word that acts as a unary operator in operand position
    pub fn from_unary_word(word: &str) -> Option<Operator> {
        use Operator::*;
        match word {
            "abs" => Some(Abs),
            "count" => Some(Count),
            "exists" => Some(Exists),
            "max" => Some(Max),
            "min" => Some(Min),
            "avg" => Some(Avg),
            "same" => Some(Same),
            "first" => Some(First),
            _ => None,
        }
    }

    /// Recognize a reserved word (tagged as an operator by the tokenizer)
    pub fn from_reserved_word(word: &str) -> Option<Operator> {
        use Operator::*;
        match word {
            "if" => Some(If),
            "then" => Some(Then),
            "else" => Some(Else),
            "with" => Some(With),
            "instanceof" => Some(InstanceOf),
            "derivativeof" => Some(DerivativeOf),
            _ => None,
        }
    }

    /// The reversal table: when the left operand is a transparent primitive
    /// and the right operand is a composite value, the operation is retried
    /// with operands swapped and this mirrored operator, so composite types
    /// only implement the "composite is left" half.
    ///
    /// `+`, `*` and the (in)equalities are symmetric; orderings swap.
    pub fn reversed(self) -> Option<Operator> {
        use Operator::*;
        match self {
            Add | Multiply | Equal | NotEqual | StrictEqual | StrictNotEqual => Some(self),
            Greater => Some(Less),
            Less => Some(Greater),
            GreaterEqual => Some(LessEqual),
            LessEqual => Some(GreaterEqual),
            StrictGreater => Some(StrictLess),
            StrictLess => Some(StrictGreater),
            StrictGreaterEqual => Some(StrictLessEqual),
            StrictLessEqual => Some(StrictGreaterEqual),
            _ => None,
        }
    }

    /// True for the strict comparison family, which always yields an exact
    /// boolean and never consults accuracy/error bounds.
    pub fn is_strict_comparison(self) -> bool {
        use Operator::*;
        matches!(
            self,
            StrictEqual
                | StrictNotEqual
                | StrictLess
                | StrictGreater
                | StrictLessEqual
                | StrictGreaterEqual
        )
    }

    /// True for any equality or inequality operator, lenient or strict
    pub fn is_equality(self) -> bool {
        use Operator::*;
        matches!(self, Equal | NotEqual | StrictEqual | StrictNotEqual)
    }

    /// True for any ordering comparison, lenient or strict
    pub fn is_ordering(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Less | Greater
                | LessEqual
                | GreaterEqual
                | StrictLess
                | StrictGreater
                | StrictLessEqual
                | StrictGreaterEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;
        let s = match self {
            Assign => "=",
            Equal => "==",
            NotEqual => "!=",
            StrictEqual => "===",
            StrictNotEqual => "!==",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            StrictLess => "<<",
            StrictGreater => ">>",
            StrictLessEqual => "<==",
            StrictGreaterEqual => ">==",
            And => "&&",
            Or => "||",
            Not => "!",
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Negate => "-",
            InstanceOf => "instanceof",
            DerivativeOf => "derivativeof",
            Map => "map",
            Filter => "filter",
            Collect => "collect",
            Sort => "sort",
            At => "at",
            Skip => "skip",
            Truncate => "truncate",
            Abs => "abs",
            Count => "count",
            Exists => "exists",
            Max => "max",
            Min => "min",
            Avg => "avg",
            Same => "same",
            First => "first",
            Dot => ".",
            If => "if",
            Then => "then",
            Else => "else",
            With => "with",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            Comma => ",",
            Colon => ":",
            AtSign => "@",
            FatArrow => "=>",
        };
        write!(f, "{}", s)
    }
}
