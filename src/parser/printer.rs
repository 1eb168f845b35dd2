use serde_json::{Map, Value};

use super::ast::*;
use super::loc::Loc;
use super::options::PrintOptions;
use super::source::Source;

/// Builds an ESTree JSON tree for a program. Nodes are built on a stack, so the properties of a
/// node are added between `start_node` and `end_node`.
struct Printer<'a> {
    source: &'a Source,
    options: PrintOptions,
    nodes: Vec<Map<String, Value>>,
}

impl<'a> Printer<'a> {
    fn new(source: &'a Source, options: PrintOptions) -> Printer<'a> {
        Printer { source, options, nodes: vec![] }
    }

    fn start_node(&mut self, name: &str, loc: &Loc) {
        let mut node = Map::new();
        node.insert("type".to_owned(), Value::from(name));

        if self.options.ranges {
            node.insert("start".to_owned(), Value::from(loc.start));
            node.insert("end".to_owned(), Value::from(loc.end));
        }

        if self.options.loc {
            let (start_line, start_col) = self.source.line_col_for_pos(loc.start);
            let (end_line, end_col) = self.source.line_col_for_pos(loc.end);

            node.insert(
                "loc".to_owned(),
                serde_json::json!({
                    "start": { "line": start_line, "column": start_col },
                    "end": { "line": end_line, "column": end_col },
                }),
            );
        }

        self.nodes.push(node);
    }

    fn end_node(&mut self) -> Value {
        Value::Object(self.nodes.pop().unwrap_or_default())
    }

    fn insert(&mut self, name: &str, value: Value) {
        if let Some(node) = self.nodes.last_mut() {
            node.insert(name.to_owned(), value);
        }
    }

    fn property<T>(&mut self, name: &str, value: T, print_value_fn: fn(&mut Self, T) -> Value) {
        let value = print_value_fn(self, value);
        self.insert(name, value);
    }

    fn array_property<T>(&mut self, name: &str, values: &[T], print_value_fn: fn(&mut Self, &T) -> Value) {
        let values = values
            .iter()
            .map(|value| print_value_fn(self, value))
            .collect();
        self.insert(name, Value::Array(values));
    }

    fn optional_property<T>(
        &mut self,
        name: &str,
        value: Option<T>,
        print_value_fn: fn(&mut Self, T) -> Value,
    ) {
        let value = match value {
            Some(value) => print_value_fn(self, value),
            None => Value::Null,
        };
        self.insert(name, value);
    }

    fn bool_property(&mut self, name: &str, value: bool) {
        self.insert(name, Value::Bool(value));
    }

    fn str_property(&mut self, name: &str, value: &str) {
        self.insert(name, Value::from(value));
    }

    fn raw_property(&mut self, loc: &Loc) {
        if self.options.raw {
            let raw = self.source.contents[loc.to_range()].to_owned();
            self.insert("raw", Value::String(raw));
        }
    }

    fn print_program(&mut self, program: &Program) -> Value {
        self.start_node("Program", &program.loc);
        self.array_property("body", &program.toplevels, Printer::print_toplevel);

        let source_type = match program.kind {
            ProgramKind::Script => "script",
            ProgramKind::Module => "module",
        };
        self.str_property("sourceType", source_type);

        self.end_node()
    }

    fn print_toplevel(&mut self, toplevel: &Toplevel) -> Value {
        match toplevel {
            Toplevel::Statement(stmt) => self.print_statement(stmt),
            Toplevel::Import(import) => self.print_import_declaration(import),
            Toplevel::ExportDefault(export) => self.print_export_default_declaration(export),
            Toplevel::ExportNamed(export) => self.print_export_named_declaration(export),
            Toplevel::ExportAll(export) => self.print_export_all_declaration(export),
        }
    }

    fn print_statement(&mut self, stmt: &Statement) -> Value {
        match stmt {
            Statement::VarDecl(var_decl) => self.print_variable_declaration(var_decl),
            Statement::FuncDecl(func) => self.print_function(func, "FunctionDeclaration"),
            Statement::ClassDecl(class) => self.print_class(class, "ClassDeclaration"),
            Statement::Expr(stmt) => self.print_expression_statement(stmt),
            Statement::Block(block) => self.print_block(block),
            Statement::If(stmt) => self.print_if_statement(stmt),
            Statement::Switch(stmt) => self.print_switch_statement(stmt),
            Statement::For(stmt) => self.print_for_statement(stmt),
            Statement::ForEach(stmt) => self.print_for_each_statement(stmt),
            Statement::While(stmt) => self.print_while_statement(stmt),
            Statement::DoWhile(stmt) => self.print_do_while_statement(stmt),
            Statement::With(stmt) => self.print_with_statement(stmt),
            Statement::Try(stmt) => self.print_try_statement(stmt),
            Statement::Throw(stmt) => {
                self.start_node("ThrowStatement", &stmt.loc);
                self.property("argument", stmt.argument.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Statement::Return(stmt) => {
                self.start_node("ReturnStatement", &stmt.loc);
                self.optional_property("argument", stmt.argument.as_deref(), Printer::print_expression);
                self.end_node()
            }
            Statement::Break(stmt) => {
                self.start_node("BreakStatement", &stmt.loc);
                self.optional_property("label", stmt.label.as_ref(), Printer::print_label);
                self.end_node()
            }
            Statement::Continue(stmt) => {
                self.start_node("ContinueStatement", &stmt.loc);
                self.optional_property("label", stmt.label.as_ref(), Printer::print_label);
                self.end_node()
            }
            Statement::Labeled(stmt) => {
                self.start_node("LabeledStatement", &stmt.loc);
                self.property("label", stmt.label.as_ref(), Printer::print_label);
                self.property("body", stmt.body.as_ref(), Printer::print_statement);
                self.end_node()
            }
            Statement::Empty(loc) => {
                self.start_node("EmptyStatement", loc);
                self.end_node()
            }
            Statement::Debugger(loc) => {
                self.start_node("DebuggerStatement", loc);
                self.end_node()
            }
        }
    }

    fn print_variable_declaration(&mut self, var_decl: &VariableDeclaration) -> Value {
        self.start_node("VariableDeclaration", &var_decl.loc);
        self.array_property(
            "declarations",
            &var_decl.declarations,
            Printer::print_variable_declarator,
        );

        let kind = match var_decl.kind {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        };
        self.str_property("kind", kind);

        self.end_node()
    }

    fn print_variable_declarator(&mut self, declarator: &VariableDeclarator) -> Value {
        self.start_node("VariableDeclarator", &declarator.loc);
        self.property("id", declarator.id.as_ref(), Printer::print_pattern);
        self.optional_property("init", declarator.init.as_deref(), Printer::print_expression);
        self.end_node()
    }

    fn print_function(&mut self, func: &Function, name: &str) -> Value {
        self.start_node(name, &func.loc);
        self.optional_property("id", func.id.as_deref(), Printer::print_identifier);
        self.array_property("params", &func.params, Printer::print_function_param);

        match func.body.as_ref() {
            FunctionBody::Block(block) => {
                let body = self.print_function_block_body(block);
                self.insert("body", body);
            }
            FunctionBody::Expression(expr) => {
                let body = self.print_expression(expr);
                self.insert("body", body);
            }
        }

        self.bool_property("async", func.is_async());
        self.bool_property("generator", func.is_generator());

        if func.is_arrow() {
            self.bool_property("expression", matches!(*func.body, FunctionBody::Expression(_)));
        }

        self.end_node()
    }

    fn print_function_block_body(&mut self, block: &FunctionBlockBody) -> Value {
        self.start_node("BlockStatement", &block.loc);
        self.array_property("body", &block.body, Printer::print_statement);
        self.end_node()
    }

    fn print_function_param(&mut self, param: &FunctionParam) -> Value {
        match param {
            FunctionParam::Pattern(pattern) => self.print_pattern(pattern),
            FunctionParam::Rest(rest) => self.print_rest_element(rest),
        }
    }

    fn print_class(&mut self, class: &Class, name: &str) -> Value {
        self.start_node(name, &class.loc);
        self.optional_property("id", class.id.as_deref(), Printer::print_identifier);
        self.optional_property("superClass", class.super_class.as_deref(), Printer::print_expression);

        self.start_node("ClassBody", &class.body_loc);
        self.array_property("body", &class.body, Printer::print_class_element);
        let body = self.end_node();
        self.insert("body", body);

        self.end_node()
    }

    fn print_class_element(&mut self, element: &ClassElement) -> Value {
        match element {
            ClassElement::Method(method) => {
                self.start_node("MethodDefinition", &method.loc);
                self.property("key", method.key.as_ref(), Printer::print_expression);

                let value = self.print_function(&method.value, "FunctionExpression");
                self.insert("value", value);

                let kind = match method.kind {
                    ClassMethodKind::Method => "method",
                    ClassMethodKind::Constructor => "constructor",
                    ClassMethodKind::Get => "get",
                    ClassMethodKind::Set => "set",
                };
                self.str_property("kind", kind);
                self.bool_property("computed", method.is_computed);
                self.bool_property("static", method.is_static);

                self.end_node()
            }
            ClassElement::Property(property) => {
                self.start_node("PropertyDefinition", &property.loc);
                self.property("key", property.key.as_ref(), Printer::print_expression);
                self.optional_property("value", property.value.as_deref(), Printer::print_expression);
                self.bool_property("computed", property.is_computed);
                self.bool_property("static", property.is_static);
                self.end_node()
            }
            ClassElement::StaticBlock(block) => {
                self.start_node("StaticBlock", &block.loc);
                self.array_property("body", &block.body, Printer::print_statement);
                self.end_node()
            }
        }
    }

    fn print_expression_statement(&mut self, stmt: &ExpressionStatement) -> Value {
        self.start_node("ExpressionStatement", &stmt.loc);
        self.property("expression", stmt.expr.as_ref(), Printer::print_expression);

        if self.options.directives {
            if let Some(directive) = &stmt.directive {
                self.str_property("directive", directive);
            }
        }

        self.end_node()
    }

    fn print_block(&mut self, block: &Block) -> Value {
        self.start_node("BlockStatement", &block.loc);
        self.array_property("body", &block.body, Printer::print_statement);
        self.end_node()
    }

    fn print_if_statement(&mut self, stmt: &IfStatement) -> Value {
        self.start_node("IfStatement", &stmt.loc);
        self.property("test", stmt.test.as_ref(), Printer::print_expression);
        self.property("consequent", stmt.conseq.as_ref(), Printer::print_statement);
        self.optional_property("alternate", stmt.altern.as_deref(), Printer::print_statement);
        self.end_node()
    }

    fn print_switch_statement(&mut self, stmt: &SwitchStatement) -> Value {
        self.start_node("SwitchStatement", &stmt.loc);
        self.property("discriminant", stmt.discriminant.as_ref(), Printer::print_expression);
        self.array_property("cases", &stmt.cases, Printer::print_switch_case);
        self.end_node()
    }

    fn print_switch_case(&mut self, case: &SwitchCase) -> Value {
        self.start_node("SwitchCase", &case.loc);
        self.optional_property("test", case.test.as_deref(), Printer::print_expression);
        self.array_property("consequent", &case.body, Printer::print_statement);
        self.end_node()
    }

    fn print_for_statement(&mut self, stmt: &ForStatement) -> Value {
        self.start_node("ForStatement", &stmt.loc);
        self.optional_property("init", stmt.init.as_deref(), Printer::print_for_init);
        self.optional_property("test", stmt.test.as_deref(), Printer::print_expression);
        self.optional_property("update", stmt.update.as_deref(), Printer::print_expression);
        self.property("body", stmt.body.as_ref(), Printer::print_statement);
        self.end_node()
    }

    fn print_for_init(&mut self, init: &ForInit) -> Value {
        match init {
            ForInit::Expression(expr) => self.print_expression(expr),
            ForInit::VarDecl(decl) => self.print_variable_declaration(decl),
        }
    }

    fn print_for_each_statement(&mut self, stmt: &ForEachStatement) -> Value {
        let name = match stmt.kind {
            ForEachKind::In => "ForInStatement",
            ForEachKind::Of => "ForOfStatement",
        };

        self.start_node(name, &stmt.loc);

        let left = match stmt.left.as_ref() {
            ForEachInit::VarDecl(decl) => self.print_variable_declaration(decl),
            ForEachInit::Pattern(pattern) => self.print_pattern(pattern),
        };
        self.insert("left", left);

        self.property("right", stmt.right.as_ref(), Printer::print_expression);
        self.property("body", stmt.body.as_ref(), Printer::print_statement);

        if stmt.kind == ForEachKind::Of {
            self.bool_property("await", stmt.is_await);
        }

        self.end_node()
    }

    fn print_while_statement(&mut self, stmt: &WhileStatement) -> Value {
        self.start_node("WhileStatement", &stmt.loc);
        self.property("test", stmt.test.as_ref(), Printer::print_expression);
        self.property("body", stmt.body.as_ref(), Printer::print_statement);
        self.end_node()
    }

    fn print_do_while_statement(&mut self, stmt: &DoWhileStatement) -> Value {
        self.start_node("DoWhileStatement", &stmt.loc);
        self.property("body", stmt.body.as_ref(), Printer::print_statement);
        self.property("test", stmt.test.as_ref(), Printer::print_expression);
        self.end_node()
    }

    fn print_with_statement(&mut self, stmt: &WithStatement) -> Value {
        self.start_node("WithStatement", &stmt.loc);
        self.property("object", stmt.object.as_ref(), Printer::print_expression);
        self.property("body", stmt.body.as_ref(), Printer::print_statement);
        self.end_node()
    }

    fn print_try_statement(&mut self, stmt: &TryStatement) -> Value {
        self.start_node("TryStatement", &stmt.loc);
        self.property("block", stmt.block.as_ref(), Printer::print_block);
        self.optional_property("handler", stmt.handler.as_deref(), Printer::print_catch_clause);
        self.optional_property("finalizer", stmt.finalizer.as_deref(), Printer::print_block);
        self.end_node()
    }

    fn print_catch_clause(&mut self, catch: &CatchClause) -> Value {
        self.start_node("CatchClause", &catch.loc);
        self.optional_property("param", catch.param.as_deref(), Printer::print_pattern);
        self.property("body", catch.body.as_ref(), Printer::print_block);
        self.end_node()
    }

    fn print_label(&mut self, label: &Label) -> Value {
        self.start_node("Identifier", &label.loc);
        self.str_property("name", &label.name);
        self.end_node()
    }

    fn print_identifier(&mut self, id: &Identifier) -> Value {
        self.start_node("Identifier", &id.loc);
        self.str_property("name", &id.name);
        self.end_node()
    }

    fn print_expression(&mut self, expr: &Expression) -> Value {
        match expr {
            Expression::Id(id) => self.print_identifier(id),
            Expression::PrivateName(id) => {
                self.start_node("PrivateIdentifier", &id.loc);
                self.str_property("name", &id.name);
                self.end_node()
            }
            Expression::Null(loc) => {
                self.start_node("Literal", loc);
                self.insert("value", Value::Null);
                self.raw_property(loc);
                self.end_node()
            }
            Expression::Boolean(lit) => {
                self.start_node("Literal", &lit.loc);
                self.bool_property("value", lit.value);
                self.raw_property(&lit.loc);
                self.end_node()
            }
            Expression::Number(lit) => {
                self.start_node("Literal", &lit.loc);
                self.insert("value", number_value(lit.value));
                self.raw_property(&lit.loc);
                self.end_node()
            }
            Expression::String(lit) => self.print_string_literal(lit),
            Expression::BigInt(lit) => {
                self.start_node("Literal", &lit.loc);
                self.insert("value", Value::Null);
                self.str_property("bigint", &lit.value.to_string());
                self.raw_property(&lit.loc);
                self.end_node()
            }
            Expression::RegExp(lit) => {
                self.start_node("Literal", &lit.loc);
                self.insert("value", Value::Null);
                self.insert(
                    "regex",
                    serde_json::json!({ "pattern": lit.pattern, "flags": lit.flags }),
                );
                self.raw_property(&lit.loc);
                self.end_node()
            }
            Expression::Unary(unary) => {
                self.start_node("UnaryExpression", &unary.loc);
                self.str_property("operator", unary_operator_str(unary.operator));
                self.bool_property("prefix", true);
                self.property("argument", unary.argument.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Binary(binary) => {
                self.start_node("BinaryExpression", &binary.loc);
                self.str_property("operator", binary_operator_str(binary.operator));
                self.property("left", binary.left.as_ref(), Printer::print_expression);
                self.property("right", binary.right.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Logical(logical) => {
                self.start_node("LogicalExpression", &logical.loc);
                self.str_property("operator", logical_operator_str(logical.operator));
                self.property("left", logical.left.as_ref(), Printer::print_expression);
                self.property("right", logical.right.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Assign(assign) => {
                self.start_node("AssignmentExpression", &assign.loc);
                self.str_property("operator", assignment_operator_str(assign.operator));
                self.property("left", assign.left.as_ref(), Printer::print_pattern);
                self.property("right", assign.right.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Update(update) => {
                self.start_node("UpdateExpression", &update.loc);
                let operator = match update.operator {
                    UpdateOperator::Increment => "++",
                    UpdateOperator::Decrement => "--",
                };
                self.str_property("operator", operator);
                self.bool_property("prefix", update.is_prefix);
                self.property("argument", update.argument.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Member(member) => self.print_member_expression(member),
            Expression::Chain(chain) => {
                self.start_node("ChainExpression", &chain.loc);
                self.property("expression", chain.expression.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Conditional(cond) => {
                self.start_node("ConditionalExpression", &cond.loc);
                self.property("test", cond.test.as_ref(), Printer::print_expression);
                self.property("consequent", cond.conseq.as_ref(), Printer::print_expression);
                self.property("alternate", cond.altern.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Call(call) => {
                self.start_node("CallExpression", &call.loc);
                self.property("callee", call.callee.as_ref(), Printer::print_expression);
                self.array_property("arguments", &call.arguments, Printer::print_call_argument);
                self.bool_property("optional", call.is_optional);
                self.end_node()
            }
            Expression::New(new) => {
                self.start_node("NewExpression", &new.loc);
                self.property("callee", new.callee.as_ref(), Printer::print_expression);
                self.array_property("arguments", &new.arguments, Printer::print_call_argument);
                self.end_node()
            }
            Expression::Sequence(seq) => {
                self.start_node("SequenceExpression", &seq.loc);
                self.array_property("expressions", &seq.expressions, Printer::print_expression);
                self.end_node()
            }
            Expression::Array(array) => {
                self.start_node("ArrayExpression", &array.loc);
                self.array_property("elements", &array.elements, Printer::print_array_element);
                self.end_node()
            }
            Expression::Object(object) => {
                self.start_node("ObjectExpression", &object.loc);
                self.array_property("properties", &object.properties, Printer::print_property);
                self.end_node()
            }
            Expression::Function(func) => self.print_function(func, "FunctionExpression"),
            Expression::ArrowFunction(func) => self.print_function(func, "ArrowFunctionExpression"),
            Expression::Class(class) => self.print_class(class, "ClassExpression"),
            Expression::This(loc) => {
                self.start_node("ThisExpression", loc);
                self.end_node()
            }
            Expression::Await(expr) => {
                self.start_node("AwaitExpression", &expr.loc);
                self.property("argument", expr.argument.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Expression::Yield(expr) => {
                self.start_node("YieldExpression", &expr.loc);
                self.optional_property("argument", expr.argument.as_deref(), Printer::print_expression);
                self.bool_property("delegate", expr.is_delegate);
                self.end_node()
            }
            Expression::SuperMember(member) => {
                self.start_node("MemberExpression", &member.loc);
                let object = self.print_super(&member.super_);
                self.insert("object", object);
                self.property("property", member.property.as_ref(), Printer::print_expression);
                self.bool_property("computed", member.is_computed);
                self.bool_property("optional", false);
                self.end_node()
            }
            Expression::SuperCall(call) => {
                self.start_node("CallExpression", &call.loc);
                let callee = self.print_super(&call.super_);
                self.insert("callee", callee);
                self.array_property("arguments", &call.arguments, Printer::print_call_argument);
                self.bool_property("optional", false);
                self.end_node()
            }
            Expression::Template(template) => self.print_template_literal(template),
            Expression::TaggedTemplate(tagged) => {
                self.start_node("TaggedTemplateExpression", &tagged.loc);
                self.property("tag", tagged.tag.as_ref(), Printer::print_expression);
                self.property("quasi", tagged.quasi.as_ref(), Printer::print_template_literal);
                self.end_node()
            }
            Expression::MetaProperty(meta) => self.print_meta_property(meta),
            Expression::Import(import) => {
                self.start_node("ImportExpression", &import.loc);
                self.property("source", import.source.as_ref(), Printer::print_expression);
                self.optional_property("options", import.options.as_deref(), Printer::print_expression);
                self.end_node()
            }
            Expression::JSXElement(element) => self.print_jsx_element(element),
            Expression::JSXFragment(fragment) => self.print_jsx_fragment(fragment),
        }
    }

    fn print_string_literal(&mut self, lit: &StringLiteral) -> Value {
        self.start_node("Literal", &lit.loc);
        self.str_property("value", &lit.value);
        self.raw_property(&lit.loc);
        self.end_node()
    }

    fn print_super(&mut self, loc: &Loc) -> Value {
        self.start_node("Super", loc);
        self.end_node()
    }

    fn print_member_expression(&mut self, member: &MemberExpression) -> Value {
        self.start_node("MemberExpression", &member.loc);
        self.property("object", member.object.as_ref(), Printer::print_expression);
        self.property("property", member.property.as_ref(), Printer::print_expression);
        self.bool_property("computed", member.is_computed);
        self.bool_property("optional", member.is_optional);
        self.end_node()
    }

    fn print_meta_property(&mut self, meta: &MetaProperty) -> Value {
        let (meta_name, property_name) = match meta.kind {
            MetaPropertyKind::NewTarget => ("new", "target"),
            MetaPropertyKind::ImportMeta => ("import", "meta"),
        };

        let meta_loc = Loc::new(meta.loc.start, meta.loc.start + meta_name.len());
        let property_loc = Loc::new(meta.loc.end - property_name.len(), meta.loc.end);

        self.start_node("MetaProperty", &meta.loc);

        let meta_id = Identifier::new(meta_loc, meta_name.to_owned());
        self.property("meta", &meta_id, Printer::print_identifier);

        let property_id = Identifier::new(property_loc, property_name.to_owned());
        self.property("property", &property_id, Printer::print_identifier);

        self.end_node()
    }

    fn print_call_argument(&mut self, argument: &CallArgument) -> Value {
        match argument {
            CallArgument::Expression(expr) => self.print_expression(expr),
            CallArgument::Spread(spread) => self.print_spread_element(spread),
        }
    }

    fn print_spread_element(&mut self, spread: &SpreadElement) -> Value {
        self.start_node("SpreadElement", &spread.loc);
        self.property("argument", spread.argument.as_ref(), Printer::print_expression);
        self.end_node()
    }

    fn print_array_element(&mut self, element: &ArrayElement) -> Value {
        match element {
            ArrayElement::Expression(expr) => self.print_expression(expr),
            ArrayElement::Spread(spread) => self.print_spread_element(spread),
            ArrayElement::Hole(_) => Value::Null,
        }
    }

    fn print_property(&mut self, property: &Property) -> Value {
        let kind = match &property.kind {
            PropertyKind::Spread(_) => {
                self.start_node("SpreadElement", &property.loc);
                self.property("argument", property.key.as_ref(), Printer::print_expression);
                return self.end_node();
            }
            PropertyKind::Init | PropertyKind::PatternInitializer(_) => "init",
            PropertyKind::Get => "get",
            PropertyKind::Set => "set",
        };

        self.start_node("Property", &property.loc);
        self.property("key", property.key.as_ref(), Printer::print_expression);

        // Shorthand properties use the key as the value
        let value = match (&property.value, &property.kind) {
            (Some(value), _) => self.print_expression(value),
            (None, PropertyKind::PatternInitializer(init)) => {
                self.start_node("AssignmentPattern", &property.loc);
                self.property("left", property.key.as_ref(), Printer::print_expression);
                self.property("right", init.as_ref(), Printer::print_expression);
                self.end_node()
            }
            (None, _) => self.print_expression(&property.key),
        };
        self.insert("value", value);

        self.str_property("kind", kind);
        self.bool_property("method", property.is_method);
        self.bool_property("shorthand", property.value.is_none());
        self.bool_property("computed", property.is_computed);

        self.end_node()
    }

    fn print_template_literal(&mut self, template: &TemplateLiteral) -> Value {
        self.start_node("TemplateLiteral", &template.loc);

        let num_quasis = template.quasis.len();
        let quasis = template
            .quasis
            .iter()
            .enumerate()
            .map(|(i, quasi)| self.print_template_element(quasi, i + 1 == num_quasis))
            .collect();
        self.insert("quasis", Value::Array(quasis));

        self.array_property("expressions", &template.expressions, Printer::print_expression);
        self.end_node()
    }

    fn print_template_element(&mut self, element: &TemplateElement, is_tail: bool) -> Value {
        self.start_node("TemplateElement", &element.loc);

        let cooked = match &element.cooked {
            Some(cooked) => Value::from(cooked.as_str()),
            None => Value::Null,
        };
        self.insert(
            "value",
            serde_json::json!({ "raw": element.raw, "cooked": cooked }),
        );
        self.bool_property("tail", is_tail);

        self.end_node()
    }

    fn print_pattern(&mut self, pattern: &Pattern) -> Value {
        match pattern {
            Pattern::Id(id) => self.print_identifier(id),
            Pattern::Array(array) => {
                self.start_node("ArrayPattern", &array.loc);
                self.array_property("elements", &array.elements, Printer::print_array_pattern_element);
                self.end_node()
            }
            Pattern::Object(object) => {
                self.start_node("ObjectPattern", &object.loc);
                self.array_property(
                    "properties",
                    &object.properties,
                    Printer::print_object_pattern_property,
                );
                self.end_node()
            }
            Pattern::Assign(assign) => {
                self.start_node("AssignmentPattern", &assign.loc);
                self.property("left", assign.left.as_ref(), Printer::print_pattern);
                self.property("right", assign.right.as_ref(), Printer::print_expression);
                self.end_node()
            }
            Pattern::Member(member) => self.print_member_expression(member),
            Pattern::SuperMember(member) => {
                self.start_node("MemberExpression", &member.loc);
                let object = self.print_super(&member.super_);
                self.insert("object", object);
                self.property("property", member.property.as_ref(), Printer::print_expression);
                self.bool_property("computed", member.is_computed);
                self.bool_property("optional", false);
                self.end_node()
            }
        }
    }

    fn print_array_pattern_element(&mut self, element: &ArrayPatternElement) -> Value {
        match element {
            ArrayPatternElement::Pattern(pattern) => self.print_pattern(pattern),
            ArrayPatternElement::Rest(rest) => self.print_rest_element(rest),
            ArrayPatternElement::Hole(_) => Value::Null,
        }
    }

    fn print_rest_element(&mut self, rest: &RestElement) -> Value {
        self.start_node("RestElement", &rest.loc);
        self.property("argument", rest.argument.as_ref(), Printer::print_pattern);
        self.end_node()
    }

    fn print_object_pattern_property(&mut self, property: &ObjectPatternProperty) -> Value {
        if property.is_rest {
            self.start_node("RestElement", &property.loc);
            self.property("argument", property.value.as_ref(), Printer::print_pattern);
            return self.end_node();
        }

        self.start_node("Property", &property.loc);
        self.optional_property("key", property.key.as_deref(), Printer::print_expression);
        self.property("value", property.value.as_ref(), Printer::print_pattern);
        self.str_property("kind", "init");
        self.bool_property("method", false);
        self.bool_property("shorthand", property.is_shorthand);
        self.bool_property("computed", property.is_computed);
        self.end_node()
    }

    fn print_import_declaration(&mut self, import: &ImportDeclaration) -> Value {
        self.start_node("ImportDeclaration", &import.loc);
        self.array_property("specifiers", &import.specifiers, Printer::print_import_specifier);
        self.property("source", import.source.as_ref(), Printer::print_string_literal);
        self.print_import_attributes(import.attributes.as_deref());
        self.end_node()
    }

    fn print_import_specifier(&mut self, specifier: &ImportSpecifier) -> Value {
        match specifier {
            ImportSpecifier::Default(default) => {
                self.start_node("ImportDefaultSpecifier", &default.loc);
                self.property("local", default.local.as_ref(), Printer::print_identifier);
                self.end_node()
            }
            ImportSpecifier::Namespace(namespace) => {
                self.start_node("ImportNamespaceSpecifier", &namespace.loc);
                self.property("local", namespace.local.as_ref(), Printer::print_identifier);
                self.end_node()
            }
            ImportSpecifier::Named(named) => {
                self.start_node("ImportSpecifier", &named.loc);

                let imported = match &named.imported {
                    Some(imported) => self.print_export_name(imported),
                    None => self.print_identifier(&named.local),
                };
                self.insert("imported", imported);

                self.property("local", named.local.as_ref(), Printer::print_identifier);
                self.end_node()
            }
        }
    }

    /// Import attributes are only printed when present, since they require next syntax.
    fn print_import_attributes(&mut self, attributes: Option<&ImportAttributes>) {
        if let Some(attributes) = attributes {
            self.array_property("attributes", &attributes.attributes, Printer::print_import_attribute);
        }
    }

    fn print_import_attribute(&mut self, attribute: &ImportAttribute) -> Value {
        self.start_node("ImportAttribute", &attribute.loc);
        self.property("key", &attribute.key, Printer::print_export_name);
        self.property("value", &attribute.value, Printer::print_string_literal);
        self.end_node()
    }

    fn print_export_name(&mut self, name: &ExportName) -> Value {
        match name {
            ExportName::Id(id) => self.print_identifier(id),
            ExportName::String(lit) => self.print_string_literal(lit),
        }
    }

    fn print_export_default_declaration(&mut self, export: &ExportDefaultDeclaration) -> Value {
        self.start_node("ExportDefaultDeclaration", &export.loc);

        let declaration = match &export.declaration {
            ExportDefaultKind::Function(func) => self.print_function(func, "FunctionDeclaration"),
            ExportDefaultKind::Class(class) => self.print_class(class, "ClassDeclaration"),
            ExportDefaultKind::Expression(expr) => self.print_expression(expr),
        };
        self.insert("declaration", declaration);

        self.end_node()
    }

    fn print_export_named_declaration(&mut self, export: &ExportNamedDeclaration) -> Value {
        self.start_node("ExportNamedDeclaration", &export.loc);
        self.optional_property("declaration", export.declaration.as_deref(), Printer::print_statement);
        self.array_property("specifiers", &export.specifiers, Printer::print_export_specifier);
        self.optional_property("source", export.source.as_deref(), Printer::print_string_literal);
        self.print_import_attributes(export.attributes.as_deref());
        self.end_node()
    }

    fn print_export_specifier(&mut self, specifier: &ExportSpecifier) -> Value {
        self.start_node("ExportSpecifier", &specifier.loc);
        self.property("local", specifier.local.as_ref(), Printer::print_export_name);

        let exported = specifier.exported.as_deref().unwrap_or(&specifier.local);
        self.property("exported", exported, Printer::print_export_name);

        self.end_node()
    }

    fn print_export_all_declaration(&mut self, export: &ExportAllDeclaration) -> Value {
        self.start_node("ExportAllDeclaration", &export.loc);
        self.optional_property("exported", export.exported.as_deref(), Printer::print_export_name);
        self.property("source", export.source.as_ref(), Printer::print_string_literal);
        self.print_import_attributes(export.attributes.as_deref());
        self.end_node()
    }

    fn print_jsx_element(&mut self, element: &JSXElement) -> Value {
        self.start_node("JSXElement", &element.loc);

        self.start_node("JSXOpeningElement", &element.opening.loc);
        self.property("name", &element.opening.name, Printer::print_jsx_element_name);
        self.array_property(
            "attributes",
            &element.opening.attributes,
            Printer::print_jsx_attribute_item,
        );
        self.bool_property("selfClosing", element.opening.is_self_closing);
        let opening = self.end_node();
        self.insert("openingElement", opening);

        self.array_property("children", &element.children, Printer::print_jsx_child);

        let closing = match &element.closing {
            Some(closing) => {
                self.start_node("JSXClosingElement", &closing.loc);
                self.property("name", &closing.name, Printer::print_jsx_element_name);
                self.end_node()
            }
            None => Value::Null,
        };
        self.insert("closingElement", closing);

        self.end_node()
    }

    fn print_jsx_fragment(&mut self, fragment: &JSXFragment) -> Value {
        self.start_node("JSXFragment", &fragment.loc);

        self.start_node("JSXOpeningFragment", &fragment.opening_loc);
        let opening = self.end_node();
        self.insert("openingFragment", opening);

        self.array_property("children", &fragment.children, Printer::print_jsx_child);

        self.start_node("JSXClosingFragment", &fragment.closing_loc);
        let closing = self.end_node();
        self.insert("closingFragment", closing);

        self.end_node()
    }

    fn print_jsx_identifier(&mut self, id: &JSXIdentifier) -> Value {
        self.start_node("JSXIdentifier", &id.loc);
        self.str_property("name", &id.name);
        self.end_node()
    }

    fn print_jsx_namespaced_name(&mut self, name: &JSXNamespacedName) -> Value {
        self.start_node("JSXNamespacedName", &name.loc);
        self.property("namespace", &name.namespace, Printer::print_jsx_identifier);
        self.property("name", &name.name, Printer::print_jsx_identifier);
        self.end_node()
    }

    fn print_jsx_element_name(&mut self, name: &JSXElementName) -> Value {
        match name {
            JSXElementName::Identifier(id) => self.print_jsx_identifier(id),
            JSXElementName::Namespaced(name) => self.print_jsx_namespaced_name(name),
            JSXElementName::Member(member) => {
                self.start_node("JSXMemberExpression", &member.loc);
                self.property("object", member.object.as_ref(), Printer::print_jsx_element_name);
                self.property("property", &member.property, Printer::print_jsx_identifier);
                self.end_node()
            }
        }
    }

    fn print_jsx_attribute_item(&mut self, item: &JSXAttributeItem) -> Value {
        match item {
            JSXAttributeItem::Spread(spread) => {
                self.start_node("JSXSpreadAttribute", &spread.loc);
                self.property("argument", spread.argument.as_ref(), Printer::print_expression);
                self.end_node()
            }
            JSXAttributeItem::Attribute(attribute) => {
                self.start_node("JSXAttribute", &attribute.loc);

                let name = match &attribute.name {
                    JSXAttributeName::Identifier(id) => self.print_jsx_identifier(id),
                    JSXAttributeName::Namespaced(name) => self.print_jsx_namespaced_name(name),
                };
                self.insert("name", name);

                let value = match &attribute.value {
                    None => Value::Null,
                    Some(JSXAttributeValue::String(lit)) => self.print_string_literal(lit),
                    Some(JSXAttributeValue::Expression(container)) => {
                        self.print_jsx_expression_container(container)
                    }
                    Some(JSXAttributeValue::Element(element)) => self.print_jsx_element(element),
                    Some(JSXAttributeValue::Fragment(fragment)) => self.print_jsx_fragment(fragment),
                };
                self.insert("value", value);

                self.end_node()
            }
        }
    }

    fn print_jsx_child(&mut self, child: &JSXChild) -> Value {
        match child {
            JSXChild::Text(text) => {
                self.start_node("JSXText", &text.loc);
                self.str_property("value", &text.value);
                self.raw_property(&text.loc);
                self.end_node()
            }
            JSXChild::Element(element) => self.print_jsx_element(element),
            JSXChild::Fragment(fragment) => self.print_jsx_fragment(fragment),
            JSXChild::Expression(container) => self.print_jsx_expression_container(container),
            JSXChild::Spread(spread) => {
                self.start_node("JSXSpreadChild", &spread.loc);
                self.property("expression", spread.expression.as_ref(), Printer::print_expression);
                self.end_node()
            }
        }
    }

    fn print_jsx_expression_container(&mut self, container: &JSXExpressionContainer) -> Value {
        self.start_node("JSXExpressionContainer", &container.loc);

        let expression = match &container.expression {
            Some(expr) => self.print_expression(expr),
            None => {
                // The empty expression spans the inside of the braces
                let loc = Loc::new(container.loc.start + 1, container.loc.end - 1);
                self.start_node("JSXEmptyExpression", &loc);
                self.end_node()
            }
        };
        self.insert("expression", expression);

        self.end_node()
    }
}

/// Integral numbers are printed without a fractional part. Non-finite numbers have no JSON
/// representation and are printed as null.
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9007199254740992.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn unary_operator_str(operator: UnaryOperator) -> &'static str {
    match operator {
        UnaryOperator::Plus => "+",
        UnaryOperator::Minus => "-",
        UnaryOperator::LogicalNot => "!",
        UnaryOperator::BitwiseNot => "~",
        UnaryOperator::TypeOf => "typeof",
        UnaryOperator::Void => "void",
        UnaryOperator::Delete => "delete",
    }
}

fn binary_operator_str(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Remainder => "%",
        BinaryOperator::Exponent => "**",
        BinaryOperator::EqEq => "==",
        BinaryOperator::EqEqEq => "===",
        BinaryOperator::NotEq => "!=",
        BinaryOperator::NotEqEq => "!==",
        BinaryOperator::LessThan => "<",
        BinaryOperator::LessThanOrEqual => "<=",
        BinaryOperator::GreaterThan => ">",
        BinaryOperator::GreaterThanOrEqual => ">=",
        BinaryOperator::And => "&",
        BinaryOperator::Or => "|",
        BinaryOperator::Xor => "^",
        BinaryOperator::ShiftLeft => "<<",
        BinaryOperator::ShiftRightArithmetic => ">>",
        BinaryOperator::ShiftRightLogical => ">>>",
        BinaryOperator::In | BinaryOperator::InPrivate => "in",
        BinaryOperator::InstanceOf => "instanceof",
    }
}

fn logical_operator_str(operator: LogicalOperator) -> &'static str {
    match operator {
        LogicalOperator::And => "&&",
        LogicalOperator::Or => "||",
        LogicalOperator::NullishCoalesce => "??",
    }
}

fn assignment_operator_str(operator: AssignmentOperator) -> &'static str {
    match operator {
        AssignmentOperator::Equals => "=",
        AssignmentOperator::Add => "+=",
        AssignmentOperator::Subtract => "-=",
        AssignmentOperator::Multiply => "*=",
        AssignmentOperator::Divide => "/=",
        AssignmentOperator::Remainder => "%=",
        AssignmentOperator::Exponent => "**=",
        AssignmentOperator::And => "&=",
        AssignmentOperator::Or => "|=",
        AssignmentOperator::Xor => "^=",
        AssignmentOperator::ShiftLeft => "<<=",
        AssignmentOperator::ShiftRightArithmetic => ">>=",
        AssignmentOperator::ShiftRightLogical => ">>>=",
        AssignmentOperator::LogicalAnd => "&&=",
        AssignmentOperator::LogicalOr => "||=",
        AssignmentOperator::NullishCoalesce => "??=",
    }
}

/// Build the ESTree representation of a program.
pub fn program_to_json(program: &Program, source: &Source, options: PrintOptions) -> Value {
    let mut printer = Printer::new(source, options);
    printer.print_program(program)
}

/// Print a program as pretty printed ESTree JSON.
pub fn print_program(program: &Program, source: &Source, options: PrintOptions) -> String {
    let value = program_to_json(program, source, options);
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
