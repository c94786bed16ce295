//! Vote values and the ledger transition rule.
//!
//! Each `(user, post)` pair holds at most one vote of `+1` or `-1`, and a
//! post's `points` equals the sum of its votes. [`VoteTransition::plan`]
//! decides what a new vote does to the ledger and to the cached points;
//! adapters execute the plan inside a single transaction.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::RefOr;
use utoipa::{PartialSchema, ToSchema};

/// A normalised vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum VoteValue {
    /// `+1`
    Up,
    /// `-1`
    Down,
}

impl VoteValue {
    /// Normalise a client-supplied value by sign.
    ///
    /// Negative values are downvotes; zero and positive values are upvotes.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::VoteValue;
    ///
    /// assert_eq!(VoteValue::from_raw(-7), VoteValue::Down);
    /// assert_eq!(VoteValue::from_raw(0), VoteValue::Up);
    /// assert_eq!(VoteValue::from_raw(3), VoteValue::Up);
    /// ```
    pub const fn from_raw(raw: i32) -> Self {
        if raw < 0 { Self::Down } else { Self::Up }
    }

    /// Stored ledger value.
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Contribution to a post's points.
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        value.as_i16()
    }
}

impl PartialSchema for VoteValue {
    fn schema() -> RefOr<Schema> {
        ObjectBuilder::new()
            .schema_type(Type::Integer)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int32)))
            .enum_values(Some([1, -1]))
            .examples([json!(1)])
            .into()
    }
}

impl ToSchema for VoteValue {}

/// Raised when a stored ledger value is neither `1` nor `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("vote value {0} is outside the ledger domain")]
pub struct InvalidVoteValue(pub i16);

impl TryFrom<i16> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.as_i16())
    }
}

/// What a vote does to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No previous vote: insert one.
    Insert(VoteValue),
    /// A previous vote with the opposite sign: overwrite it.
    Flip {
        /// Value being replaced.
        from: VoteValue,
        /// Value being recorded.
        to: VoteValue,
    },
    /// The same vote again: nothing changes.
    Unchanged(VoteValue),
}

impl VoteTransition {
    /// Decide the transition from the current ledger entry to `requested`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{VoteTransition, VoteValue};
    ///
    /// let flip = VoteTransition::plan(Some(VoteValue::Up), VoteValue::Down);
    /// assert_eq!(flip.points_delta(), -2);
    /// assert_eq!(VoteTransition::plan(None, VoteValue::Up).points_delta(), 1);
    /// ```
    pub const fn plan(existing: Option<VoteValue>, requested: VoteValue) -> Self {
        match existing {
            None => Self::Insert(requested),
            Some(current) if current.as_i16() == requested.as_i16() => Self::Unchanged(current),
            Some(current) => Self::Flip {
                from: current,
                to: requested,
            },
        }
    }

    /// Change to apply to the post's cached points.
    pub const fn points_delta(self) -> i32 {
        match self {
            Self::Insert(value) => value.as_i32(),
            Self::Flip { to, .. } => 2 * to.as_i32(),
            Self::Unchanged(_) => 0,
        }
    }

    /// Vote held by the ledger after the transition.
    pub const fn resulting_value(self) -> VoteValue {
        match self {
            Self::Insert(value) | Self::Unchanged(value) | Self::Flip { to: value, .. } => value,
        }
    }

    /// Short label for logs.
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Flip { .. } => "flip",
            Self::Unchanged(_) => "unchanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(i32::MIN, VoteValue::Down)]
    #[case(-1, VoteValue::Down)]
    #[case(0, VoteValue::Up)]
    #[case(1, VoteValue::Up)]
    #[case(i32::MAX, VoteValue::Up)]
    fn raw_values_normalise_by_sign(#[case] raw: i32, #[case] expected: VoteValue) {
        assert_eq!(VoteValue::from_raw(raw), expected);
    }

    #[rstest]
    #[case(None, VoteValue::Up, 1)]
    #[case(None, VoteValue::Down, -1)]
    #[case(Some(VoteValue::Up), VoteValue::Up, 0)]
    #[case(Some(VoteValue::Down), VoteValue::Down, 0)]
    #[case(Some(VoteValue::Up), VoteValue::Down, -2)]
    #[case(Some(VoteValue::Down), VoteValue::Up, 2)]
    fn plan_yields_expected_delta(
        #[case] existing: Option<VoteValue>,
        #[case] requested: VoteValue,
        #[case] delta: i32,
    ) {
        let transition = VoteTransition::plan(existing, requested);
        assert_eq!(transition.points_delta(), delta);
        assert_eq!(transition.resulting_value(), requested);
    }

    #[rstest]
    fn repeated_vote_is_unchanged() {
        let transition = VoteTransition::plan(Some(VoteValue::Up), VoteValue::Up);
        assert_eq!(transition, VoteTransition::Unchanged(VoteValue::Up));
        assert_eq!(transition.kind(), "unchanged");
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(-2)]
    fn stored_values_outside_ledger_domain_are_rejected(#[case] raw: i16) {
        assert_eq!(VoteValue::try_from(raw), Err(InvalidVoteValue(raw)));
    }

    #[rstest]
    fn schema_is_an_integer_enum() {
        let schema = serde_json::to_value(VoteValue::schema()).expect("serialise schema");
        assert_eq!(schema["type"], "integer");
        assert_eq!(schema["enum"], serde_json::json!([1, -1]));
    }

    #[rstest]
    fn vote_value_serialises_as_integer() {
        assert_eq!(
            serde_json::to_value(VoteValue::Down).expect("serialise"),
            serde_json::json!(-1)
        );
    }
}
