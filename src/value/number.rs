use std::str::FromStr;
use std::sync::LazyLock;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::ast::TypeKeyword;
use crate::context::EvalContext;
use crate::evaluator::EvalError;
use crate::registry::{Args, OpResult, OpSpec, Registry};
use crate::value::{DataType, DataValue};

/// Exact decimal number.
///
/// Backed by [`Decimal`] so values keep their scale (`2.50` stays `2.50`)
/// and arithmetic never picks up binary floating-point noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberValue {
    value: Decimal,
}

impl NumberValue {
    pub fn new(value: Decimal) -> Self {
        NumberValue { value }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Parses a trimmed decimal or scientific literal.
    pub fn parse_decimal(text: &str) -> Result<Decimal, String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err("empty number".to_string());
        }
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        Decimal::from_str(unsigned)
            .or_else(|_| Decimal::from_scientific(unsigned))
            .map_err(|e| format!("'{}' is not a number: {}", trimmed, e))
    }
}

impl From<i64> for NumberValue {
    fn from(n: i64) -> Self {
        NumberValue::new(Decimal::from(n))
    }
}

impl DataType for NumberValue {
    fn parse(_keyword: TypeKeyword, text: &str, _ctx: &EvalContext<'_>) -> Result<Self, String> {
        NumberValue::parse_decimal(text).map(NumberValue::new)
    }

    fn stringify(&self) -> Option<String> {
        Some(self.value.to_string())
    }

    fn keyword(&self) -> TypeKeyword {
        TypeKeyword::Number
    }

    fn registry() -> &'static Registry<Self> {
        &REGISTRY
    }

    fn into_data(self) -> DataValue {
        DataValue::Number(self)
    }
}

static REGISTRY: LazyLock<Registry<NumberValue>> =
    LazyLock::new(|| Registry::new(TypeKeyword::Number, OPERATIONS));

const OPERATIONS: &[OpSpec<NumberValue>] = &[
    OpSpec::variadic("add", 0, add),
    OpSpec::variadic("minus", 0, minus),
    OpSpec::variadic("multiply", 0, multiply),
    OpSpec::variadic("divide", 0, divide),
    OpSpec::fixed("round", 1, round),
    OpSpec::fixed("ceiling", 0, ceiling),
    OpSpec::fixed("floor", 0, floor),
    OpSpec::fixed("abs", 0, abs),
    OpSpec::fixed("integer", 0, integer),
];

fn operands(args: &Args, function: &str) -> Result<Vec<Decimal>, EvalError> {
    args.rest()
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            NumberValue::parse_decimal(raw).map_err(|reason| EvalError::InvalidArgument {
                function: function.to_string(),
                reason,
            })
        })
        .collect()
}

fn overflow(function: &str) -> EvalError {
    EvalError::InvalidArgument {
        function: function.to_string(),
        reason: "numeric overflow".to_string(),
    }
}

fn fold(
    mut number: NumberValue,
    args: &Args,
    function: &str,
    op: fn(Decimal, Decimal) -> Option<Decimal>,
) -> OpResult {
    for operand in operands(args, function)? {
        number.value = op(number.value, operand).ok_or_else(|| overflow(function))?;
    }
    Ok(Some(number.into_data()))
}

fn add(number: NumberValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    fold(number, args, "add", |a, b| a.checked_add(b))
}

fn minus(number: NumberValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    fold(number, args, "minus", |a, b| a.checked_sub(b))
}

fn multiply(number: NumberValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    fold(number, args, "multiply", |a, b| a.checked_mul(b))
}

fn divide(mut number: NumberValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    for operand in operands(args, "divide")? {
        if operand.is_zero() {
            return Err(EvalError::InvalidArgument {
                function: "divide".to_string(),
                reason: "division by zero".to_string(),
            });
        }
        number.value = number
            .value
            .checked_div(operand)
            .ok_or_else(|| overflow("divide"))?
            .normalize();
    }
    Ok(Some(number.into_data()))
}

/// Half-up rounding to `places` decimals (default 0).
fn round(mut number: NumberValue, args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    let places = args.int(0, "round")?.unwrap_or(0);
    let places = u32::try_from(places).map_err(|_| EvalError::InvalidArgument {
        function: "round".to_string(),
        reason: format!("negative decimal places: {}", places),
    })?;
    number.value = number
        .value
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    Ok(Some(number.into_data()))
}

fn ceiling(mut number: NumberValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    number.value = number.value.ceil();
    Ok(Some(number.into_data()))
}

fn floor(mut number: NumberValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    number.value = number.value.floor();
    Ok(Some(number.into_data()))
}

fn abs(mut number: NumberValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    number.value = number.value.abs();
    Ok(Some(number.into_data()))
}

fn integer(mut number: NumberValue, _args: &Args, _ctx: &mut EvalContext<'_>) -> OpResult {
    number.value = number.value.trunc();
    Ok(Some(number.into_data()))
}
