use bitflags::bitflags;
use num_bigint::BigInt;

use super::loc::{Loc, Pos};

pub type P<T> = Box<T>;

pub fn p<T>(node: T) -> P<T> {
    Box::new(node)
}

pub struct Program {
    pub loc: Loc,
    pub toplevels: Vec<Toplevel>,
    pub kind: ProgramKind,
    /// Whether the program is in strict mode, either from a directive, the program kind, or the
    /// options it was parsed with
    pub is_strict_mode: bool,
    /// Whether the program has a "use strict" directive
    pub has_use_strict_directive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramKind {
    Script,
    Module,
}

pub enum Toplevel {
    Statement(Statement),
    Import(ImportDeclaration),
    ExportDefault(ExportDefaultDeclaration),
    ExportNamed(ExportNamedDeclaration),
    ExportAll(ExportAllDeclaration),
}

impl Toplevel {
    pub fn loc(&self) -> Loc {
        match self {
            Toplevel::Statement(stmt) => stmt.loc(),
            Toplevel::Import(import) => import.loc,
            Toplevel::ExportDefault(export) => export.loc,
            Toplevel::ExportNamed(export) => export.loc,
            Toplevel::ExportAll(export) => export.loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub loc: Loc,
    pub name: String,
}

impl Identifier {
    pub fn new(loc: Loc, name: String) -> Identifier {
        Identifier { loc, name }
    }
}

pub enum Statement {
    VarDecl(VariableDeclaration),
    FuncDecl(P<Function>),
    ClassDecl(P<Class>),
    Expr(ExpressionStatement),
    Block(Block),
    If(IfStatement),
    Switch(SwitchStatement),
    For(ForStatement),
    ForEach(ForEachStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    With(WithStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
    Return(ReturnStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Labeled(LabeledStatement),
    Empty(Loc),
    Debugger(Loc),
}

impl Statement {
    pub fn loc(&self) -> Loc {
        match self {
            Statement::VarDecl(decl) => decl.loc,
            Statement::FuncDecl(func) => func.loc,
            Statement::ClassDecl(class) => class.loc,
            Statement::Expr(stmt) => stmt.loc,
            Statement::Block(stmt) => stmt.loc,
            Statement::If(stmt) => stmt.loc,
            Statement::Switch(stmt) => stmt.loc,
            Statement::For(stmt) => stmt.loc,
            Statement::ForEach(stmt) => stmt.loc,
            Statement::While(stmt) => stmt.loc,
            Statement::DoWhile(stmt) => stmt.loc,
            Statement::With(stmt) => stmt.loc,
            Statement::Try(stmt) => stmt.loc,
            Statement::Throw(stmt) => stmt.loc,
            Statement::Return(stmt) => stmt.loc,
            Statement::Break(stmt) => stmt.loc,
            Statement::Continue(stmt) => stmt.loc,
            Statement::Labeled(stmt) => stmt.loc,
            Statement::Empty(loc) | Statement::Debugger(loc) => *loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

pub struct VariableDeclaration {
    pub loc: Loc,
    pub kind: VarKind,
    pub declarations: Vec<VariableDeclarator>,
}

pub struct VariableDeclarator {
    pub loc: Loc,
    pub id: P<Pattern>,
    pub init: Option<P<Expression>>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FunctionFlags: u8 {
        const IS_ASYNC = 1 << 0;
        const IS_GENERATOR = 1 << 1;
        const IS_ARROW = 1 << 2;
        const HAS_SIMPLE_PARAMETER_LIST = 1 << 3;
        /// Whether the function is in strict mode, which could be inherited from surrounding context
        const IS_STRICT_MODE = 1 << 4;
        /// Whether the function has a "use strict" directive
        const HAS_USE_STRICT_DIRECTIVE = 1 << 5;
    }
}

pub struct Function {
    pub loc: Loc,
    pub id: Option<P<Identifier>>,
    pub params: Vec<FunctionParam>,
    pub body: P<FunctionBody>,
    pub flags: FunctionFlags,
}

impl Function {
    pub fn is_async(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_ASYNC)
    }

    pub fn is_generator(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_GENERATOR)
    }

    pub fn is_arrow(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_ARROW)
    }

    pub fn has_simple_parameter_list(&self) -> bool {
        self.flags
            .contains(FunctionFlags::HAS_SIMPLE_PARAMETER_LIST)
    }

    pub fn is_strict_mode(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_STRICT_MODE)
    }

    pub fn has_use_strict_directive(&self) -> bool {
        self.flags.contains(FunctionFlags::HAS_USE_STRICT_DIRECTIVE)
    }
}

pub enum FunctionParam {
    Pattern(Pattern),
    Rest(RestElement),
}

impl FunctionParam {
    pub fn loc(&self) -> Loc {
        match self {
            FunctionParam::Pattern(pattern) => pattern.loc(),
            FunctionParam::Rest(rest) => rest.loc,
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, FunctionParam::Pattern(Pattern::Id(_)))
    }

    pub fn iter_bound_names<'a, F: FnMut(&'a Identifier)>(&'a self, f: &mut F) {
        match self {
            FunctionParam::Pattern(pattern) => pattern.iter_bound_names(f),
            FunctionParam::Rest(rest) => rest.argument.iter_bound_names(f),
        }
    }
}

pub enum FunctionBody {
    Block(FunctionBlockBody),
    Expression(Expression),
}

pub struct FunctionBlockBody {
    pub loc: Loc,
    pub body: Vec<Statement>,
}

pub struct Class {
    pub loc: Loc,
    pub id: Option<P<Identifier>>,
    pub super_class: Option<P<Expression>>,
    /// Location of the braces enclosing the class body
    pub body_loc: Loc,
    pub body: Vec<ClassElement>,
}

pub enum ClassElement {
    Method(ClassMethod),
    Property(ClassProperty),
    StaticBlock(StaticBlock),
}

pub struct ClassMethod {
    pub loc: Loc,
    pub key: P<Expression>,
    pub value: P<Function>,
    pub kind: ClassMethodKind,
    pub is_computed: bool,
    pub is_static: bool,
    pub is_private: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassMethodKind {
    Method,
    Constructor,
    Get,
    Set,
}

pub struct ClassProperty {
    pub loc: Loc,
    pub key: P<Expression>,
    pub value: Option<P<Expression>>,
    pub is_computed: bool,
    pub is_static: bool,
    pub is_private: bool,
}

pub struct StaticBlock {
    pub loc: Loc,
    pub body: Vec<Statement>,
}

pub struct ExpressionStatement {
    pub loc: Loc,
    pub expr: P<Expression>,
    /// Raw text of the directive, without quotes, if this statement is part of a directive prologue
    pub directive: Option<String>,
}

pub struct Block {
    pub loc: Loc,
    pub body: Vec<Statement>,
}

pub struct IfStatement {
    pub loc: Loc,
    pub test: P<Expression>,
    pub conseq: P<Statement>,
    pub altern: Option<P<Statement>>,
}

pub struct SwitchStatement {
    pub loc: Loc,
    pub discriminant: P<Expression>,
    pub cases: Vec<SwitchCase>,
}

pub struct SwitchCase {
    pub loc: Loc,
    pub test: Option<P<Expression>>,
    pub body: Vec<Statement>,
}

pub struct ForStatement {
    pub loc: Loc,
    pub init: Option<P<ForInit>>,
    pub test: Option<P<Expression>>,
    pub update: Option<P<Expression>>,
    pub body: P<Statement>,
}

pub enum ForInit {
    Expression(Expression),
    VarDecl(VariableDeclaration),
}

pub struct ForEachStatement {
    pub loc: Loc,
    pub kind: ForEachKind,
    pub left: P<ForEachInit>,
    pub right: P<Expression>,
    pub body: P<Statement>,
    pub is_await: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForEachKind {
    In,
    Of,
}

pub enum ForEachInit {
    VarDecl(VariableDeclaration),
    Pattern(Pattern),
}

pub struct WhileStatement {
    pub loc: Loc,
    pub test: P<Expression>,
    pub body: P<Statement>,
}

pub struct DoWhileStatement {
    pub loc: Loc,
    pub test: P<Expression>,
    pub body: P<Statement>,
}

pub struct WithStatement {
    pub loc: Loc,
    pub object: P<Expression>,
    pub body: P<Statement>,
}

pub struct TryStatement {
    pub loc: Loc,
    pub block: P<Block>,
    pub handler: Option<P<CatchClause>>,
    pub finalizer: Option<P<Block>>,
}

pub struct CatchClause {
    pub loc: Loc,
    pub param: Option<P<Pattern>>,
    pub body: P<Block>,
}

pub struct ThrowStatement {
    pub loc: Loc,
    pub argument: P<Expression>,
}

pub struct ReturnStatement {
    pub loc: Loc,
    pub argument: Option<P<Expression>>,
}

pub struct BreakStatement {
    pub loc: Loc,
    pub label: Option<Label>,
}

pub struct ContinueStatement {
    pub loc: Loc,
    pub label: Option<Label>,
}

pub struct LabeledStatement {
    pub loc: Loc,
    pub label: P<Label>,
    pub body: P<Statement>,
}

pub struct Label {
    pub loc: Loc,
    pub name: String,
}

pub enum Expression {
    Id(Identifier),
    Null(Loc),
    Boolean(BooleanLiteral),
    Number(NumberLiteral),
    String(StringLiteral),
    BigInt(BigIntLiteral),
    RegExp(RegExpLiteral),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Assign(AssignmentExpression),
    Update(UpdateExpression),
    Member(MemberExpression),
    Chain(ChainExpression),
    Conditional(ConditionalExpression),
    Call(CallExpression),
    New(NewExpression),
    Sequence(SequenceExpression),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(P<Function>),
    ArrowFunction(P<Function>),
    Class(P<Class>),
    This(Loc),
    Await(AwaitExpression),
    Yield(YieldExpression),
    SuperMember(SuperMemberExpression),
    SuperCall(P<SuperCallExpression>),
    Template(TemplateLiteral),
    TaggedTemplate(TaggedTemplateExpression),
    MetaProperty(MetaProperty),
    Import(ImportExpression),
    /// A private name, only valid as the left hand side of an `in` expression
    PrivateName(Identifier),
    JSXElement(P<JSXElement>),
    JSXFragment(P<JSXFragment>),
}

impl Expression {
    /// The source location of the expression. Does not include enclosing parentheses.
    pub fn loc(&self) -> Loc {
        match self {
            Expression::Id(id) | Expression::PrivateName(id) => id.loc,
            Expression::Null(loc) | Expression::This(loc) => *loc,
            Expression::Boolean(lit) => lit.loc,
            Expression::Number(lit) => lit.loc,
            Expression::String(lit) => lit.loc,
            Expression::BigInt(lit) => lit.loc,
            Expression::RegExp(lit) => lit.loc,
            Expression::Unary(expr) => expr.loc,
            Expression::Binary(expr) => expr.loc,
            Expression::Logical(expr) => expr.loc,
            Expression::Assign(expr) => expr.loc,
            Expression::Update(expr) => expr.loc,
            Expression::Member(expr) => expr.loc,
            Expression::Chain(expr) => expr.loc,
            Expression::Conditional(expr) => expr.loc,
            Expression::Call(expr) => expr.loc,
            Expression::New(expr) => expr.loc,
            Expression::Sequence(expr) => expr.loc,
            Expression::Array(expr) => expr.loc,
            Expression::Object(expr) => expr.loc,
            Expression::Function(expr) => expr.loc,
            Expression::ArrowFunction(expr) => expr.loc,
            Expression::Class(expr) => expr.loc,
            Expression::Await(expr) => expr.loc,
            Expression::Yield(expr) => expr.loc,
            Expression::SuperMember(expr) => expr.loc,
            Expression::SuperCall(expr) => expr.loc,
            Expression::Template(expr) => expr.loc,
            Expression::TaggedTemplate(expr) => expr.loc,
            Expression::MetaProperty(expr) => expr.loc,
            Expression::Import(expr) => expr.loc,
            Expression::JSXElement(expr) => expr.loc,
            Expression::JSXFragment(expr) => expr.loc,
        }
    }

    /// The source position of the start of the expression.
    pub fn pos(&self) -> Pos {
        self.loc().start
    }
}

pub struct BooleanLiteral {
    pub loc: Loc,
    pub value: bool,
}

pub struct NumberLiteral {
    pub loc: Loc,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLiteral {
    pub loc: Loc,
    pub value: String,
}

pub struct BigIntLiteral {
    pub loc: Loc,
    pub value: BigInt,
}

pub struct RegExpLiteral {
    pub loc: Loc,
    pub pattern: String,
    pub flags: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    LogicalNot,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
}

pub struct UnaryExpression {
    pub loc: Loc,
    pub operator: UnaryOperator,
    pub argument: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRightArithmetic,
    ShiftRightLogical,
    // All in expressions with a non-private name LHS
    In,
    // Only for private name LHS. Left expr will always be a private name.
    InPrivate,
    InstanceOf,
}

pub struct BinaryExpression {
    pub loc: Loc,
    pub operator: BinaryOperator,
    pub left: P<Expression>,
    pub right: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    NullishCoalesce,
}

pub struct LogicalExpression {
    pub loc: Loc,
    pub operator: LogicalOperator,
    pub left: P<Expression>,
    pub right: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentOperator {
    Equals,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRightArithmetic,
    ShiftRightLogical,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
}

pub struct AssignmentExpression {
    pub loc: Loc,
    pub operator: AssignmentOperator,
    pub left: P<Pattern>,
    pub right: P<Expression>,
    /// Needed for reinterpreting into a pattern
    pub is_parenthesized: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

pub struct UpdateExpression {
    pub loc: Loc,
    pub operator: UpdateOperator,
    pub argument: P<Expression>,
    pub is_prefix: bool,
}

pub struct MemberExpression {
    pub loc: Loc,
    pub object: P<Expression>,
    pub property: P<Expression>,
    pub is_computed: bool,
    pub is_optional: bool,
    pub is_private: bool,
}

pub struct ChainExpression {
    pub loc: Loc,
    pub expression: P<Expression>,
}

pub struct ConditionalExpression {
    pub loc: Loc,
    pub test: P<Expression>,
    pub conseq: P<Expression>,
    pub altern: P<Expression>,
}

pub struct CallExpression {
    pub loc: Loc,
    pub callee: P<Expression>,
    pub arguments: Vec<CallArgument>,
    pub is_optional: bool,
}

pub enum CallArgument {
    Expression(Expression),
    Spread(SpreadElement),
}

pub struct NewExpression {
    pub loc: Loc,
    pub callee: P<Expression>,
    pub arguments: Vec<CallArgument>,
}

pub struct SequenceExpression {
    pub loc: Loc,
    pub expressions: Vec<Expression>,
}

pub struct ArrayExpression {
    pub loc: Loc,
    pub elements: Vec<ArrayElement>,
    /// Needed for reinterpreting into a pattern
    pub is_parenthesized: bool,
}

pub enum ArrayElement {
    Expression(Expression),
    Spread(SpreadElement),
    Hole(Pos),
}

pub struct SpreadElement {
    pub loc: Loc,
    pub argument: P<Expression>,
    /// Whether the spread element is directly followed by a comma
    pub has_trailing_comma: bool,
}

pub struct ObjectExpression {
    pub loc: Loc,
    pub properties: Vec<Property>,
    /// Needed for reinterpreting into a pattern
    pub is_parenthesized: bool,
}

pub struct Property {
    pub loc: Loc,
    pub key: P<Expression>,
    /// Absent for shorthand properties, where the key is also the value
    pub value: Option<P<Expression>>,
    pub is_computed: bool,
    pub is_method: bool,
    pub kind: PropertyKind,
}

pub enum PropertyKind {
    Init,
    Get,
    Set,
    // For spread properties the key is the argument and all other fields are ignored. The single
    // bool argument is whether the spread property is followed by a comma.
    Spread(bool),
    // A shorthand property with an initializer, which is only valid once reinterpreted as an
    // object pattern property. The single expression argument is the initializer.
    PatternInitializer(P<Expression>),
}

pub struct AwaitExpression {
    pub loc: Loc,
    pub argument: P<Expression>,
}

pub struct YieldExpression {
    pub loc: Loc,
    pub argument: Option<P<Expression>>,
    pub is_delegate: bool,
}

pub struct SuperMemberExpression {
    pub loc: Loc,
    pub super_: Loc,
    pub property: P<Expression>,
    pub is_computed: bool,
}

pub struct SuperCallExpression {
    pub loc: Loc,
    pub super_: Loc,
    pub arguments: Vec<CallArgument>,
}

pub struct TemplateLiteral {
    pub loc: Loc,
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
}

pub struct TemplateElement {
    pub loc: Loc,
    pub raw: String,
    /// Absent if the template element contains an invalid escape sequence, only allowed in
    /// tagged templates
    pub cooked: Option<String>,
}

pub struct TaggedTemplateExpression {
    pub loc: Loc,
    pub tag: P<Expression>,
    pub quasi: P<TemplateLiteral>,
}

pub struct MetaProperty {
    pub loc: Loc,
    pub kind: MetaPropertyKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaPropertyKind {
    NewTarget,
    ImportMeta,
}

pub struct ImportExpression {
    pub loc: Loc,
    pub source: P<Expression>,
    pub options: Option<P<Expression>>,
}

pub enum Pattern {
    Id(Identifier),
    Array(ArrayPattern),
    Object(ObjectPattern),
    Assign(AssignmentPattern),
    Member(MemberExpression),
    SuperMember(SuperMemberExpression),
}

impl Pattern {
    pub fn loc(&self) -> Loc {
        match self {
            Pattern::Id(id) => id.loc,
            Pattern::Array(pattern) => pattern.loc,
            Pattern::Object(pattern) => pattern.loc,
            Pattern::Assign(pattern) => pattern.loc,
            Pattern::Member(expr) => expr.loc,
            Pattern::SuperMember(expr) => expr.loc,
        }
    }

    /// Visit every identifier bound by this pattern, in source order.
    pub fn iter_bound_names<'a, F: FnMut(&'a Identifier)>(&'a self, f: &mut F) {
        match self {
            Pattern::Id(id) => f(id),
            Pattern::Array(array) => {
                for element in &array.elements {
                    match element {
                        ArrayPatternElement::Pattern(pattern) => pattern.iter_bound_names(f),
                        ArrayPatternElement::Rest(rest) => rest.argument.iter_bound_names(f),
                        ArrayPatternElement::Hole(_) => {}
                    }
                }
            }
            Pattern::Object(object) => {
                for property in &object.properties {
                    property.value.iter_bound_names(f);
                }
            }
            Pattern::Assign(assign) => assign.left.iter_bound_names(f),
            Pattern::Member(_) | Pattern::SuperMember(_) => {}
        }
    }
}

pub struct ArrayPattern {
    pub loc: Loc,
    pub elements: Vec<ArrayPatternElement>,
}

pub enum ArrayPatternElement {
    Pattern(Pattern),
    Rest(RestElement),
    Hole(Pos),
}

pub struct RestElement {
    pub loc: Loc,
    pub argument: P<Pattern>,
}

pub struct ObjectPattern {
    pub loc: Loc,
    pub properties: Vec<ObjectPatternProperty>,
}

pub struct ObjectPatternProperty {
    pub loc: Loc,
    /// Absent for rest properties
    pub key: Option<P<Expression>>,
    pub value: P<Pattern>,
    pub is_computed: bool,
    pub is_rest: bool,
    pub is_shorthand: bool,
}

pub struct AssignmentPattern {
    pub loc: Loc,
    pub left: P<Pattern>,
    pub right: P<Expression>,
}

pub struct ImportDeclaration {
    pub loc: Loc,
    pub specifiers: Vec<ImportSpecifier>,
    pub source: P<StringLiteral>,
    pub attributes: Option<P<ImportAttributes>>,
}

pub struct ImportAttributes {
    pub loc: Loc,
    pub attributes: Vec<ImportAttribute>,
}

pub struct ImportAttribute {
    pub loc: Loc,
    pub key: ExportName,
    pub value: StringLiteral,
}

pub enum ImportSpecifier {
    Default(ImportDefaultSpecifier),
    Named(ImportNamedSpecifier),
    Namespace(ImportNamespaceSpecifier),
}

pub struct ImportDefaultSpecifier {
    pub loc: Loc,
    pub local: P<Identifier>,
}

pub struct ImportNamedSpecifier {
    pub loc: Loc,
    /// Absent when the imported name is the same as the local name
    pub imported: Option<P<ExportName>>,
    pub local: P<Identifier>,
}

pub struct ImportNamespaceSpecifier {
    pub loc: Loc,
    pub local: P<Identifier>,
}

pub struct ExportNamedDeclaration {
    pub loc: Loc,
    pub declaration: Option<P<Statement>>,
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<P<StringLiteral>>,
    pub attributes: Option<P<ImportAttributes>>,
}

pub struct ExportSpecifier {
    pub loc: Loc,
    pub local: P<ExportName>,
    /// Absent when the exported name is the same as the local name
    pub exported: Option<P<ExportName>>,
}

pub struct ExportDefaultDeclaration {
    pub loc: Loc,
    pub declaration: ExportDefaultKind,
}

pub enum ExportDefaultKind {
    Function(P<Function>),
    Class(P<Class>),
    Expression(P<Expression>),
}

pub struct ExportAllDeclaration {
    pub loc: Loc,
    pub exported: Option<P<ExportName>>,
    pub source: P<StringLiteral>,
    pub attributes: Option<P<ImportAttributes>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExportName {
    Id(Identifier),
    String(StringLiteral),
}

impl ExportName {
    pub fn loc(&self) -> Loc {
        match self {
            ExportName::Id(id) => id.loc,
            ExportName::String(lit) => lit.loc,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExportName::Id(id) => &id.name,
            ExportName::String(lit) => &lit.value,
        }
    }
}

pub struct JSXElement {
    pub loc: Loc,
    pub opening: JSXOpeningElement,
    pub children: Vec<JSXChild>,
    /// Absent for self closing elements
    pub closing: Option<JSXClosingElement>,
}

pub struct JSXOpeningElement {
    pub loc: Loc,
    pub name: JSXElementName,
    pub attributes: Vec<JSXAttributeItem>,
    pub is_self_closing: bool,
}

pub struct JSXClosingElement {
    pub loc: Loc,
    pub name: JSXElementName,
}

pub struct JSXFragment {
    pub loc: Loc,
    pub opening_loc: Loc,
    pub closing_loc: Loc,
    pub children: Vec<JSXChild>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JSXIdentifier {
    pub loc: Loc,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JSXNamespacedName {
    pub loc: Loc,
    pub namespace: JSXIdentifier,
    pub name: JSXIdentifier,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JSXMemberExpression {
    pub loc: Loc,
    pub object: P<JSXElementName>,
    pub property: JSXIdentifier,
}

#[derive(Clone, Debug, PartialEq)]
pub enum JSXElementName {
    Identifier(JSXIdentifier),
    Namespaced(JSXNamespacedName),
    Member(JSXMemberExpression),
}

impl JSXElementName {
    pub fn loc(&self) -> Loc {
        match self {
            JSXElementName::Identifier(id) => id.loc,
            JSXElementName::Namespaced(name) => name.loc,
            JSXElementName::Member(member) => member.loc,
        }
    }

    /// Full name as written in source, used to match opening and closing tags.
    pub fn to_source_name(&self) -> String {
        match self {
            JSXElementName::Identifier(id) => id.name.clone(),
            JSXElementName::Namespaced(name) => {
                format!("{}:{}", name.namespace.name, name.name.name)
            }
            JSXElementName::Member(member) => {
                format!("{}.{}", member.object.to_source_name(), member.property.name)
            }
        }
    }
}

pub enum JSXAttributeItem {
    Attribute(JSXAttribute),
    Spread(JSXSpreadAttribute),
}

pub struct JSXAttribute {
    pub loc: Loc,
    pub name: JSXAttributeName,
    pub value: Option<JSXAttributeValue>,
}

pub enum JSXAttributeName {
    Identifier(JSXIdentifier),
    Namespaced(JSXNamespacedName),
}

pub enum JSXAttributeValue {
    String(StringLiteral),
    Expression(JSXExpressionContainer),
    Element(P<JSXElement>),
    Fragment(P<JSXFragment>),
}

pub struct JSXSpreadAttribute {
    pub loc: Loc,
    pub argument: P<Expression>,
}

pub enum JSXChild {
    Text(JSXText),
    Element(P<JSXElement>),
    Fragment(P<JSXFragment>),
    Expression(JSXExpressionContainer),
    Spread(JSXSpreadChild),
}

pub struct JSXText {
    pub loc: Loc,
    pub value: String,
}

pub struct JSXExpressionContainer {
    pub loc: Loc,
    /// Absent for an empty container such as `{}` or `{/* comment */}`
    pub expression: Option<P<Expression>>,
}

pub struct JSXSpreadChild {
    pub loc: Loc,
    pub expression: P<Expression>,
}
