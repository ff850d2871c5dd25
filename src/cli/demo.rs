use crate::cli::{aborted, confirm, open_store, refresh};
use crate::error::Result;
use crate::settings::Settings;

/// Two owner accounts sharing three plans, plus two contact mails.
pub(crate) const SAMPLE: &str = r#"{
  "accounts": [
    {
      "id": 1,
      "name": "ShareSub #1",
      "country": "FR",
      "account_email": "owner1@example.com",
      "iban_masked": "FR76••••1234",
      "monthly_revenue": 23.00,
      "monthly_cost": 17.99,
      "subscriptions": [
        {
          "id": 101,
          "platform": "spotify",
          "plan": "Famille",
          "email": "spotify.owner@example.com",
          "password": "Sp0t!2025",
          "price_you_pay_month": 17.99,
          "renew_date": "2025-10-14",
          "comment": "Compte principal, prévenir avant de changer le mot de passe.",
          "members": [
            { "id": 1, "pseudo": "Chainez S.", "mail": "chainez@example.com", "monthly_fee": 3.50 },
            { "id": 2, "pseudo": "Maxime C.", "mail": "maxime@example.com", "monthly_fee": 3.50 },
            { "id": 3, "pseudo": "Nicolas L.", "mail": "nicolas@example.com", "monthly_fee": 3.50 },
            { "id": 4, "pseudo": "Tiphanie L.", "mail": "tiphanie@example.com", "monthly_fee": 3.50 },
            { "id": 5, "pseudo": "Morad B.", "mail": "morad@example.com", "monthly_fee": 3.50 }
          ]
        },
        {
          "id": 102,
          "platform": "youtube",
          "plan": "Premium",
          "email": "yt.owner@example.com",
          "password": "Y0uTube@2025",
          "price_you_pay_month": 19.99,
          "renew_date": "2025-10-05",
          "comment": "Profil Famille uniquement.",
          "members": [
            { "id": 6, "pseudo": "Elamine I.", "mail": "elamine@example.com", "monthly_fee": 3.50 },
            { "id": 7, "pseudo": "Carlo", "mail": "carlo@example.com", "monthly_fee": 3.50 },
            { "id": 8, "pseudo": "Aurélie J.", "mail": "aurelie@example.com", "monthly_fee": 3.50 },
            { "id": 9, "pseudo": "Benjamin H.", "mail": "benjamin@example.com", "monthly_fee": 3.50 },
            { "id": 10, "pseudo": "Alex L.", "mail": "alex@example.com", "monthly_fee": 3.50 }
          ]
        }
      ]
    },
    {
      "id": 2,
      "name": "ShareSub #2",
      "country": "FR",
      "account_email": "owner2@example.com",
      "iban_masked": "FR76••••5678",
      "monthly_revenue": 7.00,
      "monthly_cost": 3.54,
      "subscriptions": [
        {
          "id": 201,
          "platform": "spotify",
          "plan": "Individuel",
          "email": "spot2@example.com",
          "password": "Sp!ndiv25",
          "price_you_pay_month": 3.54,
          "renew_date": "2025-11-10",
          "comment": "Compte de test.",
          "members": [
            { "id": 11, "pseudo": "Abd", "mail": "abd@example.com", "monthly_fee": 3.50 },
            { "id": 12, "pseudo": "Mathilde C.", "mail": "mathilde@example.com", "monthly_fee": 3.50 }
          ]
        }
      ]
    }
  ],
  "emails": [
    { "id": 1, "address": "support@slicesub.com", "country": "FR", "enabled": false, "last_check": "2025-08-22 12:10" },
    { "id": 2, "address": "notif.sharesub@gmail.com", "country": "FR", "enabled": true, "last_check": "2025-08-22 11:50" }
  ]
}"#;

pub fn run(settings: &Settings, yes: bool) -> Result<()> {
    let store = open_store(settings)?;
    if confirm("Replace the current database with sample data?", yes)?.is_none() {
        return aborted();
    }
    let db = store.import_json(SAMPLE)?;
    let members: usize = db.accounts.iter().map(|a| a.member_count()).sum();
    println!(
        "Loaded demo data: {} accounts, {} members, {} emails.",
        db.accounts.len(),
        members,
        db.emails.len()
    );
    println!("Try `sharesub report` to see the dashboard.");
    refresh(&store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{kpis, subscription_members_total};
    use crate::store::parse_document;

    #[test]
    fn test_sample_is_a_valid_document() {
        let db = parse_document(SAMPLE).unwrap();
        assert_eq!(db.accounts.len(), 2);
        assert_eq!(db.emails.len(), 2);
        assert_eq!(db.accounts[0].subscriptions.len(), 2);
        assert_eq!(db.accounts[0].member_count(), 10);
        assert_eq!(db.accounts[1].member_count(), 2);
        assert!(!db.emails[0].enabled);
        assert!(db.emails[1].enabled);
    }

    #[test]
    fn test_sample_totals() {
        let db = parse_document(SAMPLE).unwrap();
        let k = kpis(&db);
        assert!((k.revenue - 30.0).abs() < 1e-9);
        assert!((k.cost - 21.53).abs() < 1e-9);
        assert!((k.margin - 8.47).abs() < 1e-9);
        assert_eq!(k.accounts, 2);
        let spotify = db.accounts[0].subscription(101).unwrap();
        assert!((subscription_members_total(spotify) - 17.5).abs() < 1e-9);
    }
}
