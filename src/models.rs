use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub type AccountId = u64;
pub type SubscriptionId = u64;
pub type MemberId = u64;
pub type EmailId = u64;

/// Root document. This is the whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub accounts: Vec<Account>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub emails: Vec<EmailRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: EmailId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    /// Empty when unknown.
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub enabled: bool,
    /// Free-form, e.g. `2025-08-22 12:10`. Never parsed.
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_check: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: AccountId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_email: String,
    /// Display-only, never validated.
    #[serde(default, deserialize_with = "lenient_string")]
    pub iban_masked: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub monthly_revenue: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub monthly_cost: f64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: SubscriptionId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plan: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    /// Stored in clear text, same as every other field of the blob.
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub price_you_pay_month: f64,
    #[serde(
        default,
        serialize_with = "serialize_date",
        deserialize_with = "lenient_date"
    )]
    pub renew_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comment: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: MemberId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pseudo: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mail: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub monthly_fee: f64,
}

impl Account {
    pub fn subscription(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    pub fn member_count(&self) -> usize {
        self.subscriptions.iter().map(|s| s.members.len()).sum()
    }
}

impl Database {
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn email(&self, id: EmailId) -> Option<&EmailRecord> {
        self.emails.iter().find(|e| e.id == id)
    }
}

// Field payloads. `None` means "not part of the form": create falls back to
// the type default, edit leaves the stored value alone.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountFields {
    pub name: Option<String>,
    pub country: Option<String>,
    pub account_email: Option<String>,
    pub iban_masked: Option<String>,
    pub monthly_revenue: Option<f64>,
    pub monthly_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFields {
    pub platform: Option<String>,
    pub plan: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub price_you_pay_month: Option<f64>,
    /// `Some(None)` clears the date.
    pub renew_date: Option<Option<NaiveDate>>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberFields {
    pub pseudo: Option<String>,
    pub mail: Option<String>,
    pub monthly_fee: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailFields {
    pub address: Option<String>,
    pub country: Option<String>,
    pub enabled: Option<bool>,
    pub last_check: Option<String>,
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl AccountFields {
    pub fn into_account(self, id: AccountId) -> Account {
        let mut account = Account {
            id,
            ..Account::default()
        };
        self.apply(&mut account);
        account
    }

    pub fn apply(self, account: &mut Account) {
        overwrite(&mut account.name, self.name);
        overwrite(&mut account.country, self.country);
        overwrite(&mut account.account_email, self.account_email);
        overwrite(&mut account.iban_masked, self.iban_masked);
        overwrite(&mut account.monthly_revenue, self.monthly_revenue);
        overwrite(&mut account.monthly_cost, self.monthly_cost);
    }
}

impl SubscriptionFields {
    pub fn into_subscription(self, id: SubscriptionId) -> Subscription {
        let mut sub = Subscription {
            id,
            ..Subscription::default()
        };
        self.apply(&mut sub);
        sub
    }

    pub fn apply(self, sub: &mut Subscription) {
        overwrite(&mut sub.platform, self.platform);
        overwrite(&mut sub.plan, self.plan);
        overwrite(&mut sub.email, self.email);
        overwrite(&mut sub.password, self.password);
        overwrite(&mut sub.price_you_pay_month, self.price_you_pay_month);
        overwrite(&mut sub.renew_date, self.renew_date);
        overwrite(&mut sub.comment, self.comment);
    }
}

impl MemberFields {
    pub fn into_member(self, id: MemberId) -> Member {
        let mut member = Member {
            id,
            ..Member::default()
        };
        self.apply(&mut member);
        member
    }

    pub fn apply(self, member: &mut Member) {
        overwrite(&mut member.pseudo, self.pseudo);
        overwrite(&mut member.mail, self.mail);
        overwrite(&mut member.monthly_fee, self.monthly_fee);
    }
}

impl EmailFields {
    pub fn into_email(self, id: EmailId) -> EmailRecord {
        let mut email = EmailRecord {
            id,
            ..EmailRecord::default()
        };
        self.apply(&mut email);
        email
    }

    pub fn apply(self, email: &mut EmailRecord) {
        overwrite(&mut email.address, self.address);
        overwrite(&mut email.country, self.country);
        overwrite(&mut email.enabled, self.enabled);
        overwrite(&mut email.last_check, self.last_check);
    }
}

/// A finite amount written with either `.` or `,` as decimal separator.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Numbers and numeric strings count; anything else (missing, null, `"abc"`,
/// non-finite) is 0.
pub fn money_from_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_amount(s),
        _ => None,
    };
    parsed.unwrap_or(0.0)
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts `YYYY-MM-DD`, or a longer ISO timestamp whose first ten chars are a date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, DATE_FORMAT).ok())
        })
}

fn lenient_money<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(money_from_value(&value))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(d)?;
    let id = match &value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(id.unwrap_or(0))
}

fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        _ => Ok(Vec::new()),
    }
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => parse_date(&s),
        _ => None,
    })
}

fn serialize_date<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => s.serialize_str(&d.format(DATE_FORMAT).to_string()),
        None => s.serialize_str(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let db: Database = serde_json::from_str("{}").unwrap();
        assert!(db.accounts.is_empty());
        assert!(db.emails.is_empty());

        let db: Database =
            serde_json::from_str(r#"{"accounts":[{"id":1,"subscriptions":null}],"emails":null}"#)
                .unwrap();
        assert!(db.accounts[0].subscriptions.is_empty());
        assert!(db.emails.is_empty());
    }

    #[test]
    fn test_money_fields_are_lenient() {
        let json = r#"{"id":1,"members":[
            {"id":1,"monthly_fee":3.5},
            {"id":2,"monthly_fee":"2.25"},
            {"id":3,"monthly_fee":"abc"},
            {"id":4,"monthly_fee":null},
            {"id":5},
            {"id":6,"monthly_fee":" 3,50 "}
        ]}"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        let fees: Vec<f64> = sub.members.iter().map(|m| m.monthly_fee).collect();
        assert_eq!(fees, vec![3.5, 2.25, 0.0, 0.0, 0.0, 3.5]);
    }

    #[test]
    fn test_renew_date_roundtrip() {
        let json = r#"{"id":101,"renew_date":"2025-10-14"}"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.renew_date, NaiveDate::from_ymd_opt(2025, 10, 14));
        let out = serde_json::to_value(&sub).unwrap();
        assert_eq!(out["renew_date"], "2025-10-14");

        let empty: Subscription = serde_json::from_str(r#"{"renew_date":""}"#).unwrap();
        assert_eq!(empty.renew_date, None);
        assert_eq!(serde_json::to_value(&empty).unwrap()["renew_date"], "");
    }

    #[test]
    fn test_parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2025-11-10T00:00:00Z"), NaiveDate::from_ymd_opt(2025, 11, 10));
        assert_eq!(parse_date("10/11/2025"), None);
    }

    #[test]
    fn test_lenient_scalars() {
        let email: EmailRecord =
            serde_json::from_str(r#"{"id":"7","address":null,"enabled":"true"}"#).unwrap();
        assert_eq!(email.id, 7);
        assert_eq!(email.address, "");
        assert!(email.enabled);
        assert_eq!(email.country, "");
    }

    #[test]
    fn test_edit_fields_leave_absent_values_alone() {
        let mut account = AccountFields {
            name: Some("ShareSub #1".into()),
            monthly_revenue: Some(23.0),
            ..AccountFields::default()
        }
        .into_account(1);
        assert_eq!(account.monthly_cost, 0.0);
        assert!(account.subscriptions.is_empty());

        AccountFields {
            monthly_cost: Some(17.99),
            ..AccountFields::default()
        }
        .apply(&mut account);
        assert_eq!(account.name, "ShareSub #1");
        assert_eq!(account.monthly_revenue, 23.0);
        assert_eq!(account.monthly_cost, 17.99);
    }
}
