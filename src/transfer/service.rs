//! Transfer workflow
//!
//! Validation runs in a fixed order and the first failure wins:
//!
//! 1. recipient and amount present
//! 2. amount is a positive number with at most two decimals
//! 3. recipient is not the sender
//! 4. recipient account exists
//! 5. recipient wallet exists
//! 6. sender balance covers the amount
//!
//! Steps 1-3 need no store access. Steps 4-6 and the three writes (debit,
//! credit, ledger append) run in one transaction under the write gate, so
//! what was checked is what gets mutated and a failed commit leaves nothing
//! behind.

use serde::Deserialize;
use utoipa::ToSchema;

use super::error::TransferError;
use super::ledger::{LedgerEntry, LedgerRepository};
use crate::account::{Account, AccountRepository, Database, WalletRepository};
use crate::money::Amount;

/// Description recorded when the sender leaves it blank
pub const DEFAULT_DESCRIPTION: &str = "UPI Transfer";

/// Raw transfer form, exactly as submitted
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[serde(default)]
    #[schema(example = "bob@mockupi")]
    pub recipient_upi_id: String,
    #[serde(default)]
    #[schema(example = "300.00")]
    pub amount: String,
    #[serde(default)]
    #[schema(example = "Dinner")]
    pub description: String,
}

/// Transfer that passed every check not needing the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub recipient_upi_id: String,
    pub amount: Amount,
    pub description: String,
}

impl ValidatedTransfer {
    /// Steps 1-3
    pub fn new(sender_upi_id: &str, req: &TransferRequest) -> Result<Self, TransferError> {
        let recipient_upi_id = req.recipient_upi_id.trim().to_lowercase();
        let amount_str = req.amount.trim();

        if recipient_upi_id.is_empty() || amount_str.is_empty() {
            return Err(TransferError::MissingFields);
        }

        let amount = Amount::parse(amount_str)?;

        if recipient_upi_id == sender_upi_id {
            return Err(TransferError::SelfTransfer);
        }

        let description = match req.description.trim() {
            "" => DEFAULT_DESCRIPTION.to_string(),
            d => d.to_string(),
        };

        Ok(Self {
            recipient_upi_id,
            amount,
            description,
        })
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub entry: LedgerEntry,
    pub sender_balance: Amount,
}

impl TransferReceipt {
    /// Confirmation shown to the sender
    pub fn message(&self) -> String {
        format!(
            "Successfully sent {}{} to {}.",
            crate::money::CURRENCY_SYMBOL,
            self.entry.amount,
            self.entry.receiver_upi_id
        )
    }
}

pub struct TransferService;

impl TransferService {
    /// Validate and execute a transfer from `sender`.
    pub async fn execute(
        db: &Database,
        sender: &Account,
        req: &TransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let validated = ValidatedTransfer::new(&sender.upi_id, req)?;

        let result = Self::apply(db, sender, &validated).await;
        match &result {
            Ok(receipt) => tracing::info!(
                entry_id = receipt.entry.id,
                from = %sender.upi_id,
                to = %receipt.entry.receiver_upi_id,
                amount = %receipt.entry.amount,
                "Transfer committed"
            ),
            Err(TransferError::Storage(e)) => tracing::error!(
                from = %sender.upi_id,
                to = %validated.recipient_upi_id,
                error = %e,
                "Transfer rolled back on storage failure"
            ),
            Err(e) if e.kind() == super::ErrorKind::Integrity => tracing::error!(
                from = %sender.upi_id,
                to = %validated.recipient_upi_id,
                code = e.code(),
                "Transfer aborted on integrity violation"
            ),
            Err(e) => tracing::debug!(
                from = %sender.upi_id,
                code = e.code(),
                "Transfer rejected"
            ),
        }
        result
    }

    /// Steps 4-6 plus the writes, all in one transaction
    async fn apply(
        db: &Database,
        sender: &Account,
        validated: &ValidatedTransfer,
    ) -> Result<TransferReceipt, TransferError> {
        let _gate = db.write_gate().await;
        let mut tx = db.pool().begin().await?;

        let recipient = AccountRepository::get_by_upi_id(&mut *tx, &validated.recipient_upi_id)
            .await?
            .ok_or_else(|| TransferError::RecipientNotFound(validated.recipient_upi_id.clone()))?;

        let recipient_wallet = WalletRepository::get_by_account(&mut *tx, recipient.id)
            .await?
            .ok_or(TransferError::RecipientWalletMissing)?;

        let sender_wallet = WalletRepository::get_by_account(&mut *tx, sender.id)
            .await?
            .ok_or(TransferError::SenderWalletMissing)?;

        if sender_wallet.balance < validated.amount {
            return Err(TransferError::InsufficientBalance);
        }

        // Returning early drops `tx`, which rolls back
        if !WalletRepository::debit(&mut tx, sender_wallet.id, validated.amount).await? {
            return Err(TransferError::InsufficientBalance);
        }
        WalletRepository::credit(&mut tx, recipient_wallet.id, validated.amount).await?;

        let entry = LedgerRepository::append(
            &mut tx,
            &sender.upi_id,
            &recipient.upi_id,
            validated.amount,
            Some(&validated.description),
            chrono::Utc::now().timestamp_millis(),
        )
        .await?;

        tx.commit().await?;

        let sender_balance = sender_wallet
            .balance
            .checked_sub(validated.amount)
            .unwrap_or(Amount::ZERO);

        Ok(TransferReceipt {
            entry,
            sender_balance,
        })
    }

    /// Ledger entries visible to `account`, newest first
    pub async fn history(db: &Database, account: &Account) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        LedgerRepository::list_for_upi_id(db.pool(), &account.upi_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::STARTING_BALANCE;

    fn req(recipient: &str, amount: &str, description: &str) -> TransferRequest {
        TransferRequest {
            recipient_upi_id: recipient.to_string(),
            amount: amount.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_validation_normalizes_input() {
        let v = ValidatedTransfer::new("alice@mockupi", &req("  Bob@MockUPI ", " 300 ", "  ")).unwrap();
        assert_eq!(v.recipient_upi_id, "bob@mockupi");
        assert_eq!(v.amount, Amount::from_major_units(300));
        assert_eq!(v.description, DEFAULT_DESCRIPTION);

        let v = ValidatedTransfer::new("alice@mockupi", &req("bob@mockupi", "1", " Rent ")).unwrap();
        assert_eq!(v.description, "Rent");
    }

    #[test]
    fn test_validation_order() {
        let sender = "alice@mockupi";

        // Missing fields beat a bad amount
        assert!(matches!(
            ValidatedTransfer::new(sender, &req("", "abc", "")),
            Err(TransferError::MissingFields)
        ));
        assert!(matches!(
            ValidatedTransfer::new(sender, &req("bob@mockupi", "   ", "")),
            Err(TransferError::MissingFields)
        ));
        // A bad amount beats self-transfer
        assert!(matches!(
            ValidatedTransfer::new(sender, &req(sender, "abc", "")),
            Err(TransferError::InvalidNumber)
        ));
        assert!(matches!(
            ValidatedTransfer::new(sender, &req(sender, "0", "")),
            Err(TransferError::NonPositiveAmount)
        ));
        assert!(matches!(
            ValidatedTransfer::new(sender, &req(sender, "-10", "")),
            Err(TransferError::NonPositiveAmount)
        ));
        assert!(matches!(
            ValidatedTransfer::new(sender, &req("ALICE@mockupi", "10", "")),
            Err(TransferError::SelfTransfer)
        ));
        assert!(matches!(
            ValidatedTransfer::new(sender, &req("bob@mockupi", "10.001", "")),
            Err(TransferError::PrecisionOverflow)
        ));
    }

    #[test]
    fn test_receipt_message() {
        let receipt = TransferReceipt {
            entry: LedgerEntry {
                id: 1,
                sender_upi_id: "alice@mockupi".into(),
                receiver_upi_id: "bob@mockupi".into(),
                amount: Amount::from_major_units(300),
                description: Some(DEFAULT_DESCRIPTION.into()),
                created_at: chrono::Utc::now(),
            },
            sender_balance: Amount::from_major_units(700),
        };
        assert_eq!(receipt.message(), "Successfully sent ₹300.00 to bob@mockupi.");
    }

    // ------------------------------------------------------------------
    // Store-backed tests
    // ------------------------------------------------------------------

    async fn test_db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    async fn open_account(db: &Database, email: &str, upi_id: &str, with_wallet: bool) -> Account {
        let mut conn = db.pool().acquire().await.unwrap();
        let id = AccountRepository::insert(&mut conn, "T", email, "hash", upi_id, 0)
            .await
            .unwrap();
        if with_wallet {
            WalletRepository::create(&mut conn, id, STARTING_BALANCE)
                .await
                .unwrap();
        }
        drop(conn);
        AccountRepository::get_by_id(db.pool(), id).await.unwrap().unwrap()
    }

    async fn balance(db: &Database, account: &Account) -> Amount {
        WalletRepository::get_by_account(db.pool(), account.id)
            .await
            .unwrap()
            .unwrap()
            .balance
    }

    async fn ledger_len(db: &Database) -> i64 {
        LedgerRepository::count(db.pool()).await.unwrap()
    }

    #[tokio::test]
    async fn test_transfer_moves_funds_and_records_entry() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        let bob = open_account(&db, "bob@x.com", "bob@mockupi", true).await;
        let total_before = WalletRepository::total_balance(db.pool()).await.unwrap();

        let receipt = TransferService::execute(&db, &alice, &req("bob@mockupi", "300", ""))
            .await
            .unwrap();

        assert_eq!(receipt.sender_balance, Amount::from_major_units(700));
        assert_eq!(balance(&db, &alice).await, Amount::from_major_units(700));
        assert_eq!(balance(&db, &bob).await, Amount::from_major_units(1300));
        assert_eq!(
            WalletRepository::total_balance(db.pool()).await.unwrap(),
            total_before
        );

        assert_eq!(ledger_len(&db).await, 1);
        assert_eq!(receipt.entry.sender_upi_id, "alice@mockupi");
        assert_eq!(receipt.entry.receiver_upi_id, "bob@mockupi");
        assert_eq!(receipt.entry.amount, Amount::from_major_units(300));
        assert_eq!(receipt.entry.description.as_deref(), Some(DEFAULT_DESCRIPTION));

        let alice_history = TransferService::history(&db, &alice).await.unwrap();
        let bob_history = TransferService::history(&db, &bob).await.unwrap();
        assert_eq!(alice_history, vec![receipt.entry.clone()]);
        assert_eq!(bob_history, vec![receipt.entry]);
    }

    #[tokio::test]
    async fn test_transfer_entire_balance_leaves_zero() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        let bob = open_account(&db, "bob@x.com", "bob@mockupi", true).await;

        TransferService::execute(&db, &alice, &req("bob@mockupi", "1000.00", "all of it"))
            .await
            .unwrap();

        assert_eq!(balance(&db, &alice).await, Amount::ZERO);
        assert_eq!(balance(&db, &bob).await, Amount::from_major_units(2000));
    }

    #[tokio::test]
    async fn test_insufficient_balance_changes_nothing() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        let bob = open_account(&db, "bob@x.com", "bob@mockupi", true).await;

        let err = TransferService::execute(&db, &alice, &req("bob@mockupi", "1000.01", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance));

        assert_eq!(balance(&db, &alice).await, STARTING_BALANCE);
        assert_eq!(balance(&db, &bob).await, STARTING_BALANCE);
        assert_eq!(ledger_len(&db).await, 0);
    }

    #[tokio::test]
    async fn test_self_transfer_rejected_without_side_effects() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;

        let err = TransferService::execute(&db, &alice, &req("alice@mockupi", "10", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::SelfTransfer));
        assert_eq!(balance(&db, &alice).await, STARTING_BALANCE);
        assert_eq!(ledger_len(&db).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_number_rejected_without_side_effects() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        open_account(&db, "bob@x.com", "bob@mockupi", true).await;

        let err = TransferService::execute(&db, &alice, &req("bob@mockupi", "abc", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidNumber));
        assert_eq!(
            err.user_message(),
            "Invalid amount. Please enter a numerical value."
        );
        assert_eq!(balance(&db, &alice).await, STARTING_BALANCE);
        assert_eq!(ledger_len(&db).await, 0);
    }

    #[tokio::test]
    async fn test_overlong_fraction_is_not_rounded_into_a_transfer() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        let bob = open_account(&db, "bob@x.com", "bob@mockupi", true).await;

        for amount in [
            "1000.000000000000000000000000001",
            "0.0000000000000000000000000000001",
        ] {
            let err = TransferService::execute(&db, &alice, &req("bob@mockupi", amount, ""))
                .await
                .unwrap_err();
            assert!(matches!(err, TransferError::PrecisionOverflow), "{}", amount);
        }

        let err = TransferService::execute(
            &db,
            &alice,
            &req("bob@mockupi", "123456789012345678901234567890123", ""),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TransferError::AmountTooLarge));

        assert_eq!(balance(&db, &alice).await, STARTING_BALANCE);
        assert_eq!(balance(&db, &bob).await, STARTING_BALANCE);
        assert_eq!(ledger_len(&db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;

        let err = TransferService::execute(&db, &alice, &req("Ghost@MockUPI", "10", ""))
            .await
            .unwrap_err();
        match err {
            TransferError::RecipientNotFound(id) => assert_eq!(id, "ghost@mockupi"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recipient_without_wallet_is_integrity_error() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        open_account(&db, "bob@x.com", "bob@mockupi", false).await;

        let err = TransferService::execute(&db, &alice, &req("bob@mockupi", "10", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::RecipientWalletMissing));
        assert_eq!(err.kind(), crate::transfer::ErrorKind::Integrity);
        assert_eq!(balance(&db, &alice).await, STARTING_BALANCE);
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_everything() {
        let db = test_db().await;
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        let bob = open_account(&db, "bob@x.com", "bob@mockupi", true).await;

        // Debit and credit succeed, then the ledger append fails
        sqlx::query(
            "CREATE TRIGGER ledger_down BEFORE INSERT ON ledger_entries \
             BEGIN SELECT RAISE(ABORT, 'ledger unavailable'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = TransferService::execute(&db, &alice, &req("bob@mockupi", "300", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Storage(_)));
        assert_eq!(err.user_message(), "Transfer failed. Please try again later.");

        assert_eq!(balance(&db, &alice).await, STARTING_BALANCE);
        assert_eq!(balance(&db, &bob).await, STARTING_BALANCE);
        assert_eq!(ledger_len(&db).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_transfers_never_overdraw() {
        let db = std::sync::Arc::new(test_db().await);
        let alice = open_account(&db, "alice@x.com", "alice@mockupi", true).await;
        open_account(&db, "bob@x.com", "bob@mockupi", true).await;
        let total_before = WalletRepository::total_balance(db.pool()).await.unwrap();

        // 8 x 300 against a balance of 1000: exactly 3 can succeed
        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            let alice = alice.clone();
            handles.push(tokio::spawn(async move {
                TransferService::execute(&db, &alice, &req("bob@mockupi", "300", "")).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(TransferError::InsufficientBalance) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(ok, 3);
        assert_eq!(balance(&db, &alice).await, Amount::from_major_units(100));
        assert_eq!(ledger_len(&db).await, 3);
        assert_eq!(
            WalletRepository::total_balance(db.pool()).await.unwrap(),
            total_before
        );
    }
}
