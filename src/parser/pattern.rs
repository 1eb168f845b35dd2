//! Reinterpretation of expressions parsed under the cover grammar as assignment targets or
//! binding patterns, e.g. the array literal in `[a, b] = c` or the parenthesized list in
//! `(a, {b}) => c`.

use super::ast::*;
use super::loc::Loc;
use super::parse_error::ParseError;

pub struct ReinterpretError {
    pub loc: Loc,
    pub error: ParseError,
}

type ReinterpretResult<T> = Result<T, ReinterpretError>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// Left hand side of an assignment or for each statement. Member expressions are allowed.
    Assignment,
    /// Declared names, such as arrow function parameters. Only identifiers may be targets.
    Binding,
}

fn error<T>(loc: Loc, error: ParseError) -> ReinterpretResult<T> {
    Err(ReinterpretError { loc, error })
}

/// Reinterpret an expression as the target of an assignment or for each statement.
pub fn reinterpret_as_assignment_target(
    expr: Expression,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    reinterpret_target(expr, PatternKind::Assignment, is_strict)
}

/// Reinterpret an expression as a binding pattern that declares names.
pub fn reinterpret_as_binding_pattern(
    expr: Expression,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    reinterpret_target(expr, PatternKind::Binding, is_strict)
}

/// Reinterpret an expression as a binding pattern that may have a default value, such as a
/// parameter of an arrow function.
pub fn reinterpret_as_binding_element(
    expr: Expression,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    reinterpret_element(expr, PatternKind::Binding, is_strict)
}

/// Compound assignment operators only allow simple targets.
pub fn reinterpret_as_simple_assignment_target(
    expr: Expression,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    match expr {
        Expression::Id(_) | Expression::Member(_) | Expression::SuperMember(_) => {
            reinterpret_target(expr, PatternKind::Assignment, is_strict)
        }
        other => error(other.loc(), ParseError::InvalidAssignmentLeftHandSide),
    }
}

fn invalid_target_error(kind: PatternKind) -> ParseError {
    match kind {
        PatternKind::Assignment => ParseError::InvalidAssignmentLeftHandSide,
        PatternKind::Binding => ParseError::InvalidArrowParameters,
    }
}

fn reinterpret_id(id: Identifier, kind: PatternKind, is_strict: bool) -> ReinterpretResult<Pattern> {
    // Cannot assign to or bind arguments or eval in strict mode
    if is_strict {
        let restricted_error = match (id.name.as_str(), kind) {
            ("eval", PatternKind::Assignment) => Some(ParseError::AssignEvalInStrictMode),
            ("arguments", PatternKind::Assignment) => Some(ParseError::AssignArgumentsInStrictMode),
            ("eval" | "arguments", PatternKind::Binding) => {
                Some(ParseError::StrictModeRestrictedBinding(id.name.clone()))
            }
            _ => None,
        };

        if let Some(restricted_error) = restricted_error {
            return error(id.loc, restricted_error);
        }
    }

    Ok(Pattern::Id(id))
}

fn reinterpret_target(
    expr: Expression,
    kind: PatternKind,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    match expr {
        Expression::Id(id) => reinterpret_id(id, kind, is_strict),
        Expression::Object(object) => reinterpret_object(object, kind, is_strict),
        Expression::Array(array) => reinterpret_array(array, kind, is_strict),
        Expression::Member(member) if kind == PatternKind::Assignment && !member.is_optional => {
            Ok(Pattern::Member(member))
        }
        Expression::SuperMember(member) if kind == PatternKind::Assignment => {
            Ok(Pattern::SuperMember(member))
        }
        other => error(other.loc(), invalid_target_error(kind)),
    }
}

/// Elements of array and object patterns may have a default value.
fn reinterpret_element(
    expr: Expression,
    kind: PatternKind,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    match expr {
        Expression::Assign(AssignmentExpression {
            operator: AssignmentOperator::Equals,
            loc,
            left,
            right,
            is_parenthesized,
        }) => {
            // Parenthesized assignment expressions are invalid as pattern elements
            if is_parenthesized {
                return error(loc, invalid_target_error(kind));
            }

            // The left side was already reinterpreted as an assignment target when the assignment
            // was parsed, so it only needs to be checked when it must declare names.
            if kind == PatternKind::Binding {
                check_binding_pattern(&left, is_strict)?;
            }

            Ok(Pattern::Assign(AssignmentPattern { loc, left, right }))
        }
        other => reinterpret_target(other, kind, is_strict),
    }
}

/// Check that an already reinterpreted assignment target is also a valid binding pattern.
fn check_binding_pattern(pattern: &Pattern, is_strict: bool) -> ReinterpretResult<()> {
    match pattern {
        Pattern::Id(id) => {
            if is_strict && (id.name == "eval" || id.name == "arguments") {
                return error(id.loc, ParseError::StrictModeRestrictedBinding(id.name.clone()));
            }

            Ok(())
        }
        Pattern::Array(array) => {
            for element in &array.elements {
                match element {
                    ArrayPatternElement::Pattern(pattern) => {
                        check_binding_pattern(pattern, is_strict)?
                    }
                    ArrayPatternElement::Rest(rest) => {
                        check_binding_pattern(&rest.argument, is_strict)?
                    }
                    ArrayPatternElement::Hole(_) => {}
                }
            }

            Ok(())
        }
        Pattern::Object(object) => {
            for property in &object.properties {
                check_binding_pattern(&property.value, is_strict)?;
            }

            Ok(())
        }
        Pattern::Assign(assign) => check_binding_pattern(&assign.left, is_strict),
        Pattern::Member(member) => error(member.loc, ParseError::InvalidArrowParameters),
        Pattern::SuperMember(member) => error(member.loc, ParseError::InvalidArrowParameters),
    }
}

fn reinterpret_object(
    object: ObjectExpression,
    kind: PatternKind,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    if object.is_parenthesized {
        return error(object.loc, invalid_target_error(kind));
    }

    let num_properties = object.properties.len();
    let mut properties = Vec::with_capacity(num_properties);

    for (i, property) in object.properties.into_iter().enumerate() {
        let property = match property.kind {
            PropertyKind::Spread(has_trailing_comma) => {
                // Trailing commas (or properties after) are not allowed on rest element
                if has_trailing_comma || i != num_properties - 1 {
                    return error(property.loc, ParseError::RestTrailingComma);
                }

                // Object rest elements must be simple targets
                let value = match *property.key {
                    Expression::Object(inner) => {
                        return error(inner.loc, invalid_target_error(kind))
                    }
                    Expression::Array(inner) => {
                        return error(inner.loc, invalid_target_error(kind))
                    }
                    Expression::Assign(assign) => {
                        return error(assign.loc, ParseError::RestWithInitializer)
                    }
                    other => p(reinterpret_target(other, kind, is_strict)?),
                };

                ObjectPatternProperty {
                    loc: property.loc,
                    key: None,
                    value,
                    is_computed: false,
                    is_rest: true,
                    is_shorthand: false,
                }
            }
            PropertyKind::Get | PropertyKind::Set => {
                return error(property.loc, invalid_target_error(kind))
            }
            _ if property.is_method => return error(property.loc, invalid_target_error(kind)),
            PropertyKind::Init | PropertyKind::PatternInitializer(_) if property.value.is_none() => {
                // Shorthand properties, where the key is an identifier
                let id = match &*property.key {
                    Expression::Id(id) => id.clone(),
                    other => return error(other.loc(), invalid_target_error(kind)),
                };

                let id_pattern = p(reinterpret_id(id, kind, is_strict)?);

                let value = match property.kind {
                    PropertyKind::PatternInitializer(initializer) => {
                        p(Pattern::Assign(AssignmentPattern {
                            loc: property.loc,
                            left: id_pattern,
                            right: initializer,
                        }))
                    }
                    _ => id_pattern,
                };

                ObjectPatternProperty {
                    loc: property.loc,
                    key: Some(property.key),
                    value,
                    is_computed: false,
                    is_rest: false,
                    is_shorthand: true,
                }
            }
            PropertyKind::Init | PropertyKind::PatternInitializer(_) => {
                let value = match property.value {
                    Some(value) => p(reinterpret_element(*value, kind, is_strict)?),
                    None => return error(property.loc, invalid_target_error(kind)),
                };

                ObjectPatternProperty {
                    loc: property.loc,
                    key: Some(property.key),
                    value,
                    is_computed: property.is_computed,
                    is_rest: false,
                    is_shorthand: false,
                }
            }
        };

        properties.push(property);
    }

    Ok(Pattern::Object(ObjectPattern { loc: object.loc, properties }))
}

fn reinterpret_array(
    array: ArrayExpression,
    kind: PatternKind,
    is_strict: bool,
) -> ReinterpretResult<Pattern> {
    if array.is_parenthesized {
        return error(array.loc, invalid_target_error(kind));
    }

    let num_elements = array.elements.len();
    let mut elements = Vec::with_capacity(num_elements);

    for (i, element) in array.elements.into_iter().enumerate() {
        let element = match element {
            ArrayElement::Expression(expr) => {
                ArrayPatternElement::Pattern(reinterpret_element(expr, kind, is_strict)?)
            }
            ArrayElement::Hole(pos) => ArrayPatternElement::Hole(pos),
            ArrayElement::Spread(spread) => {
                // Trailing commas (or elements after) are not allowed on rest element
                if spread.has_trailing_comma || i != num_elements - 1 {
                    return error(spread.loc, ParseError::RestTrailingComma);
                }

                let argument = match *spread.argument {
                    Expression::Assign(assign) => {
                        return error(assign.loc, ParseError::RestWithInitializer)
                    }
                    other => p(reinterpret_target(other, kind, is_strict)?),
                };

                ArrayPatternElement::Rest(RestElement { loc: spread.loc, argument })
            }
        };

        elements.push(element);
    }

    Ok(Pattern::Array(ArrayPattern { loc: array.loc, elements }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(start: usize, name: &str) -> Expression {
        Expression::Id(Identifier::new(Loc::new(start, start + name.len()), name.to_owned()))
    }

    fn array(elements: Vec<ArrayElement>) -> Expression {
        Expression::Array(ArrayExpression {
            loc: Loc::new(0, 10),
            elements,
            is_parenthesized: false,
        })
    }

    #[test]
    fn array_with_rest() {
        let expr = array(vec![
            ArrayElement::Expression(id(1, "a")),
            ArrayElement::Hole(3),
            ArrayElement::Spread(SpreadElement {
                loc: Loc::new(5, 9),
                argument: p(id(8, "b")),
                has_trailing_comma: false,
            }),
        ]);

        match reinterpret_as_binding_pattern(expr, false) {
            Ok(Pattern::Array(pattern)) => {
                assert_eq!(pattern.elements.len(), 3);
                assert!(matches!(pattern.elements[2], ArrayPatternElement::Rest(_)));
            }
            _ => panic!("expected array pattern"),
        }
    }

    #[test]
    fn rest_with_trailing_comma() {
        let expr = array(vec![ArrayElement::Spread(SpreadElement {
            loc: Loc::new(1, 5),
            argument: p(id(4, "b")),
            has_trailing_comma: true,
        })]);

        let result = reinterpret_as_assignment_target(expr, false);
        assert!(matches!(result, Err(ReinterpretError { error: ParseError::RestTrailingComma, .. })));
    }

    #[test]
    fn restricted_names_in_strict_mode() {
        assert!(reinterpret_as_assignment_target(id(0, "eval"), false).is_ok());
        assert!(matches!(
            reinterpret_as_assignment_target(id(0, "eval"), true),
            Err(ReinterpretError { error: ParseError::AssignEvalInStrictMode, .. })
        ));
        assert!(matches!(
            reinterpret_as_binding_pattern(id(0, "arguments"), true),
            Err(ReinterpretError { error: ParseError::StrictModeRestrictedBinding(_), .. })
        ));
    }

    #[test]
    fn member_expressions_are_not_bindings() {
        let member = || {
            Expression::Member(MemberExpression {
                loc: Loc::new(0, 3),
                object: p(id(0, "a")),
                property: p(id(2, "b")),
                is_computed: false,
                is_optional: false,
                is_private: false,
            })
        };

        assert!(reinterpret_as_assignment_target(member(), false).is_ok());
        assert!(reinterpret_as_binding_pattern(member(), false).is_err());
    }
}
