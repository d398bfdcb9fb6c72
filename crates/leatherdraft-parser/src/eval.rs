use crate::error::{EvalError, EvalErrorKind};
use crate::expr::{BinaryOp, Builtin, Expr, UnaryOp};
use crate::scope::{Binding, Scope};

/// Parse and evaluate `expression` against `scope`.
pub fn evaluate(expression: &str, scope: &Scope) -> Result<f64, EvalError> {
    let expr = Expr::parse(expression)?;
    expr.eval(scope)
        .map_err(|kind| EvalError::new(expression, kind))
}

/// Strip one pair of `{...}` delimiters, if present.
#[must_use]
pub fn strip_delimiters(expression: &str) -> &str {
    let trimmed = expression.trim();
    trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed)
}

impl Expr {
    pub fn eval(&self, scope: &Scope) -> Result<f64, EvalErrorKind> {
        let value = match self {
            Expr::Literal(n) => *n,
            Expr::Name(name) => match scope.lookup(name) {
                Some(Binding::Number(n)) => *n,
                Some(Binding::Namespace(_)) => {
                    return Err(EvalErrorKind::NamespaceAsNumber { name: name.clone() });
                }
                None => return Err(EvalErrorKind::UnknownName { name: name.clone() }),
            },
            Expr::Attribute { base, attr } => match scope.lookup(base) {
                Some(Binding::Namespace(values)) => {
                    *values
                        .get(attr)
                        .ok_or_else(|| EvalErrorKind::UnknownAttribute {
                            base: base.clone(),
                            attr: attr.clone(),
                        })?
                }
                Some(Binding::Number(_)) => {
                    return Err(EvalErrorKind::NotANamespace { name: base.clone() });
                }
                None => return Err(EvalErrorKind::UnknownName { name: base.clone() }),
            },
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => -operand.eval(scope)?,
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval(scope)?;
                let b = rhs.eval(scope)?;
                binary(*op, a, b)?
            }
            Expr::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|a| a.eval(scope))
                    .collect::<Result<Vec<_>, _>>()?;
                call(*func, &values)?
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalErrorKind::NonFinite)
        }
    }
}

fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64, EvalErrorKind> {
    Ok(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(EvalErrorKind::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(EvalErrorKind::DivisionByZero);
            }
            a.powf(b)
        }
    })
}

fn call(func: Builtin, args: &[f64]) -> Result<f64, EvalErrorKind> {
    let arity = |message: &str| EvalErrorKind::Arity {
        func: func.name(),
        message: message.to_string(),
    };

    match func {
        Builtin::Abs => match args {
            [x] => Ok(x.abs()),
            _ => Err(arity("takes exactly one argument")),
        },
        Builtin::Min | Builtin::Max => {
            if args.len() < 2 {
                return Err(arity("takes at least two arguments"));
            }
            let pick = if func == Builtin::Min { f64::min } else { f64::max };
            Ok(args[1..].iter().copied().fold(args[0], pick))
        }
        Builtin::Round => match args {
            [x] => Ok(x.round_ties_even()),
            [x, digits] => {
                if digits.fract() != 0.0 {
                    return Err(arity("ndigits must be an integer"));
                }
                let digits = digits.clamp(-308.0, 308.0) as i32;
                let scale = 10f64.powi(digits.abs());
                if digits >= 0 {
                    let scaled = x * scale;
                    if !scaled.is_finite() {
                        return Ok(*x);
                    }
                    Ok(scaled.round_ties_even() / scale)
                } else {
                    Ok((x / scale).round_ties_even() * scale)
                }
            }
            _ => Err(arity("takes one or two arguments")),
        },
    }
}
