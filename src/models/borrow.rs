//! Borrow model and lifecycle rules

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::book::Book;
use super::user::UserInfo;

/// Borrow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Requested,
    Approved,
    Denied,
    Returned,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Requested => "requested",
            BorrowStatus::Approved => "approved",
            BorrowStatus::Denied => "denied",
            BorrowStatus::Returned => "returned",
        }
    }

    /// requested -> approved | denied, approved -> returned
    pub fn can_transition_to(self, next: BorrowStatus) -> bool {
        matches!(
            (self, next),
            (BorrowStatus::Requested, BorrowStatus::Approved)
                | (BorrowStatus::Requested, BorrowStatus::Denied)
                | (BorrowStatus::Approved, BorrowStatus::Returned)
        )
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requested" => Ok(BorrowStatus::Requested),
            "approved" => Ok(BorrowStatus::Approved),
            "denied" => Ok(BorrowStatus::Denied),
            "returned" => Ok(BorrowStatus::Returned),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Borrow model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct Borrow {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
}

impl Borrow {
    /// New request dated `now`, due after the loan period
    pub fn new_request(book_id: Uuid, user_id: Uuid, now: DateTime<Utc>, loan_period_days: i64) -> Self {
        Borrow {
            id: Uuid::new_v4(),
            book_id,
            user_id,
            borrow_date: now,
            due_date: due_date_from(now, loan_period_days),
            return_date: None,
            status: BorrowStatus::Requested,
        }
    }

    /// Apply a status change; only the return date moves, and only on return
    pub fn with_status(&self, status: BorrowStatus, now: DateTime<Utc>) -> Self {
        let mut updated = self.clone();
        updated.status = status;
        if status == BorrowStatus::Returned {
            updated.return_date = Some(now);
        }
        updated
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == BorrowStatus::Approved && self.due_date < now
    }
}

pub fn due_date_from(borrow_date: DateTime<Utc>, loan_period_days: i64) -> DateTime<Utc> {
    borrow_date + Duration::days(loan_period_days)
}

/// Borrow with its book, for the borrower's own listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowWithBook {
    #[serde(flatten)]
    pub borrow: Borrow,
    pub book: Book,
    pub is_overdue: bool,
}

/// Borrow with book and borrower, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    #[serde(flatten)]
    pub borrow: Borrow,
    pub book: Book,
    pub user: UserInfo,
    pub is_overdue: bool,
}

/// Borrow request payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub book_id: Uuid,
}

/// Status change payload (admin)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateBorrowStatus {
    pub status: BorrowStatus,
}

/// Admin listing filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BorrowQuery {
    pub status: Option<BorrowStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 10, 30, 0).unwrap()
    }

    #[test]
    fn request_is_due_fourteen_days_later() {
        let now = at(1);
        let borrow = Borrow::new_request(Uuid::new_v4(), Uuid::new_v4(), now, 14);
        assert_eq!(borrow.status, BorrowStatus::Requested);
        assert_eq!(borrow.borrow_date, now);
        assert_eq!(borrow.due_date - borrow.borrow_date, Duration::days(14));
        assert_eq!(borrow.due_date, at(15));
        assert!(borrow.return_date.is_none());
    }

    #[test]
    fn returning_sets_only_the_return_date() {
        let borrow = Borrow::new_request(Uuid::new_v4(), Uuid::new_v4(), at(1), 14)
            .with_status(BorrowStatus::Approved, at(2));
        assert!(borrow.return_date.is_none());

        let returned = borrow.with_status(BorrowStatus::Returned, at(9));
        assert_eq!(returned.status, BorrowStatus::Returned);
        assert_eq!(returned.return_date, Some(at(9)));
        assert_eq!(returned.borrow_date, borrow.borrow_date);
        assert_eq!(returned.due_date, borrow.due_date);
    }

    #[test]
    fn transitions() {
        use BorrowStatus::*;
        assert!(Requested.can_transition_to(Approved));
        assert!(Requested.can_transition_to(Denied));
        assert!(Approved.can_transition_to(Returned));

        assert!(!Requested.can_transition_to(Returned));
        assert!(!Requested.can_transition_to(Requested));
        assert!(!Approved.can_transition_to(Denied));
        assert!(!Denied.can_transition_to(Approved));
        assert!(!Returned.can_transition_to(Approved));
    }

    #[test]
    fn status_parses_and_serializes_lowercase() {
        assert_eq!("Approved".parse::<BorrowStatus>(), Ok(BorrowStatus::Approved));
        assert!("lost".parse::<BorrowStatus>().is_err());
        assert_eq!(serde_json::to_string(&BorrowStatus::Denied).unwrap(), "\"denied\"");
    }

    #[test]
    fn only_approved_borrows_go_overdue() {
        let borrow = Borrow::new_request(Uuid::new_v4(), Uuid::new_v4(), at(1), 14);
        assert!(!borrow.is_overdue(at(20)));
        let approved = borrow.with_status(BorrowStatus::Approved, at(2));
        assert!(!approved.is_overdue(at(10)));
        assert!(approved.is_overdue(at(20)));
    }
}
