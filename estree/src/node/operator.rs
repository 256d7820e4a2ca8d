/// Declares an operator enum together with its source spelling.
///
/// Every operator enum gets `as_str` (used as a comparison leaf and for
/// display) and `from_punct` (used by the parser to map an operator token).
macro_rules! operator_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn from_punct(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum! {
    /// Prefix operators of `UnaryExpression`.
    pub enum UnaryOperator {
        Minus => "-",
        Plus => "+",
        Not => "!",
        BitNot => "~",
        Typeof => "typeof",
        Void => "void",
        Delete => "delete",
    }
}

operator_enum! {
    pub enum UpdateOperator {
        Increment => "++",
        Decrement => "--",
    }
}

operator_enum! {
    /// Operators of `BinaryExpression`. Logical `&&`/`||`/`??` live in
    /// [`LogicalOperator`] because ESTree gives them their own node kind.
    pub enum BinaryOperator {
        Eq => "==",
        NotEq => "!=",
        StrictEq => "===",
        StrictNotEq => "!==",
        Lt => "<",
        LtEq => "<=",
        Gt => ">",
        GtEq => ">=",
        Shl => "<<",
        Shr => ">>",
        UShr => ">>>",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Rem => "%",
        Exp => "**",
        BitOr => "|",
        BitXor => "^",
        BitAnd => "&",
        In => "in",
        Instanceof => "instanceof",
    }
}

operator_enum! {
    pub enum LogicalOperator {
        Or => "||",
        And => "&&",
        Nullish => "??",
    }
}

operator_enum! {
    pub enum AssignmentOperator {
        Assign => "=",
        AddAssign => "+=",
        SubAssign => "-=",
        MulAssign => "*=",
        DivAssign => "/=",
        RemAssign => "%=",
        ExpAssign => "**=",
        ShlAssign => "<<=",
        ShrAssign => ">>=",
        UShrAssign => ">>>=",
        BitOrAssign => "|=",
        BitXorAssign => "^=",
        BitAndAssign => "&=",
    }
}

operator_enum! {
    /// Binding keyword of a `VariableDeclaration`.
    pub enum DeclarationKind {
        Var => "var",
        Let => "let",
        Const => "const",
    }
}

operator_enum! {
    pub enum PropertyKind {
        Init => "init",
        Get => "get",
        Set => "set",
    }
}

operator_enum! {
    pub enum MethodKind {
        Constructor => "constructor",
        Method => "method",
        Get => "get",
        Set => "set",
    }
}
