//! The request body for creating and updating expenses.

use serde::Deserialize;
use time::UtcOffset;

use crate::{
    Error, FieldError,
    date_time::{DateBound, parse_date_time},
    expense::ExpenseFields,
};

const MAX_TITLE_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// The expense fields sent by the client.
///
/// Every field may be missing so that all problems can be reported at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub title: String,
    pub amount: Option<f64>,
    /// A date or date-time string, see [parse_date_time].
    #[serde(default)]
    pub date: String,
    /// The ID of the expense's category.
    #[serde(default)]
    pub category: String,
    pub description: Option<String>,
}

impl ExpenseForm {
    /// Check every field of the form.
    ///
    /// Text fields are trimmed and an empty description becomes `None`.
    /// Timestamps with an offset are converted to `local_offset`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] listing each invalid field.
    pub fn validate(self, local_offset: UtcOffset) -> Result<ExpenseFields, Error> {
        let mut field_errors = Vec::new();

        let title = self.title.trim().to_owned();
        if title.is_empty() {
            field_errors.push(FieldError::new("title", "Title is required"));
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            field_errors.push(FieldError::new(
                "title",
                "Title must be less than 100 characters",
            ));
        }

        let amount = match self.amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => amount,
            _ => {
                field_errors.push(FieldError::new("amount", "Amount must be positive"));
                0.0
            }
        };

        let date = if self.date.trim().is_empty() {
            field_errors.push(FieldError::new("date", "Date is required"));
            None
        } else {
            parse_date_time(&self.date, DateBound::Start, local_offset)
                .inspect_err(|_| field_errors.push(FieldError::new("date", "Invalid date format")))
                .ok()
        };

        let category = self.category.trim().to_owned();
        if category.is_empty() {
            field_errors.push(FieldError::new("category", "Category is required"));
        }

        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());
        if let Some(description) = &description
            && description.chars().count() > MAX_DESCRIPTION_LENGTH
        {
            field_errors.push(FieldError::new(
                "description",
                "Description must be less than 500 characters",
            ));
        }

        match date {
            Some(date) if field_errors.is_empty() => Ok(ExpenseFields {
                title,
                amount,
                date,
                category,
                description,
            }),
            _ => Err(Error::Validation(field_errors)),
        }
    }
}

#[cfg(test)]
mod expense_form_tests {
    use time::{UtcOffset, macros::datetime};

    use crate::{
        Error, FieldError,
        expense::{ExpenseFields, ExpenseForm},
    };

    fn valid_form() -> ExpenseForm {
        ExpenseForm {
            title: " Lunch ".to_owned(),
            amount: Some(12.5),
            date: "2024-01-15".to_owned(),
            category: "abc123".to_owned(),
            description: Some("  ".to_owned()),
        }
    }

    #[test]
    fn valid_form_passes() {
        let fields = valid_form().validate(UtcOffset::UTC);

        assert_eq!(
            fields,
            Ok(ExpenseFields {
                title: "Lunch".to_owned(),
                amount: 12.5,
                date: datetime!(2024-01-15 0:00),
                category: "abc123".to_owned(),
                description: None,
            })
        );
    }

    #[test]
    fn accepts_date_time() {
        let form = ExpenseForm {
            date: "2024-01-15T18:45".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            form.validate(UtcOffset::UTC).map(|fields| fields.date),
            Ok(datetime!(2024-01-15 18:45))
        );
    }

    #[test]
    fn empty_form_lists_every_required_field() {
        let result = ExpenseForm::default().validate(UtcOffset::UTC);

        assert_eq!(
            result,
            Err(Error::Validation(vec![
                FieldError::new("title", "Title is required"),
                FieldError::new("amount", "Amount must be positive"),
                FieldError::new("date", "Date is required"),
                FieldError::new("category", "Category is required"),
            ]))
        );
    }

    #[test]
    fn rejects_bad_values() {
        let form = ExpenseForm {
            title: "a".repeat(101),
            amount: Some(-3.0),
            date: "15/01/2024".to_owned(),
            category: "abc123".to_owned(),
            description: Some("b".repeat(501)),
        };

        let result = form.validate(UtcOffset::UTC);

        assert_eq!(
            result,
            Err(Error::Validation(vec![
                FieldError::new("title", "Title must be less than 100 characters"),
                FieldError::new("amount", "Amount must be positive"),
                FieldError::new("date", "Invalid date format"),
                FieldError::new("description", "Description must be less than 500 characters"),
            ]))
        );
    }

    #[test]
    fn rejects_zero_amount() {
        let form = ExpenseForm {
            amount: Some(0.0),
            ..valid_form()
        };

        assert_eq!(
            form.validate(UtcOffset::UTC),
            Err(Error::Validation(vec![FieldError::new(
                "amount",
                "Amount must be positive"
            )]))
        );
    }
}
