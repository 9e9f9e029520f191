//! services/client/src/adapters/session_store.rs
//!
//! SQLite-backed implementation of the `SessionStore` port.
//!
//! The table is the source of truth for reads. Each value also lives in a
//! `tokio::sync::watch` channel so observers get the current value on subscription
//! and a notification after every write. Writes hold `write_lock` across the
//! database statement and the publish, which keeps observers in issue order and
//! makes `update_verification` an atomic read-modify-write.

use async_trait::async_trait;
use chrono::Utc;
use pace_core::domain::{DynamicLinkState, GuestKey, VerifiedAccount};
use pace_core::ports::{PortResult, SessionStore, ValueStream};
use sqlx::SqlitePool;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::adapters::preferences::Preferences;

const NAMESPACE: &str = "session";
const DYNAMIC_LINK_KEY: &str = "dynamic_link";
const GUEST_KEY_KEY: &str = "guest_key";
const VERIFIED_ACCOUNT_KEY: &str = "verified_account";
const VERIFICATION_EMAIL_KEY: &str = "verification_email_sent";

pub struct SqliteSessionStore {
    prefs: Preferences,
    write_lock: Mutex<()>,
    dynamic_link: watch::Sender<Option<DynamicLinkState>>,
    guest_key: watch::Sender<Option<GuestKey>>,
    verified_account: watch::Sender<Option<VerifiedAccount>>,
    verification_email_sent: watch::Sender<bool>,
}

impl SqliteSessionStore {
    /// Builds the store and seeds every observable with what is already persisted.
    pub async fn open(pool: SqlitePool) -> Self {
        let prefs = Preferences::new(pool, NAMESPACE);

        let dynamic_link = prefs.get_json::<DynamicLinkState>(DYNAMIC_LINK_KEY).await;
        let guest_key = prefs.get_json::<GuestKey>(GUEST_KEY_KEY).await;
        let verified_account = prefs.get_json::<VerifiedAccount>(VERIFIED_ACCOUNT_KEY).await;
        let verification_email_sent = prefs
            .get_json::<bool>(VERIFICATION_EMAIL_KEY)
            .await
            .unwrap_or(false);
        debug!(
            has_dynamic_link = dynamic_link.is_some(),
            has_guest_key = guest_key.is_some(),
            has_verified_account = verified_account.is_some(),
            verification_email_sent,
            "Session store loaded"
        );

        Self {
            prefs,
            write_lock: Mutex::new(()),
            dynamic_link: watch::Sender::new(dynamic_link),
            guest_key: watch::Sender::new(guest_key),
            verified_account: watch::Sender::new(verified_account),
            verification_email_sent: watch::Sender::new(verification_email_sent),
        }
    }
}

/// Turns a watch receiver into a stream that starts with the current value.
fn watch_stream<T>(mut rx: watch::Receiver<T>) -> ValueStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    Box::pin(async_stream::stream! {
        let current = rx.borrow_and_update().clone();
        yield current;
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            yield next;
        }
    })
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save_dynamic_link(&self, link: &DynamicLinkState) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        self.prefs.put_json(DYNAMIC_LINK_KEY, link).await?;
        self.dynamic_link.send_replace(Some(link.clone()));
        info!(university_id = link.university_id, verified = link.is_verified, "Saved dynamic link");
        Ok(())
    }

    async fn get_dynamic_link(&self) -> Option<DynamicLinkState> {
        self.prefs.get_json(DYNAMIC_LINK_KEY).await
    }

    fn watch_dynamic_link(&self) -> ValueStream<Option<DynamicLinkState>> {
        watch_stream(self.dynamic_link.subscribe())
    }

    async fn update_verification(&self, verified: bool) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        let Some(mut link) = self.prefs.get_json::<DynamicLinkState>(DYNAMIC_LINK_KEY).await else {
            debug!("No dynamic link stored, skipping verification update");
            return Ok(());
        };
        if link.is_verified && !verified {
            warn!(university_id = link.university_id, "Refusing to revoke a verified dynamic link");
            return Ok(());
        }
        if link.is_verified == verified {
            return Ok(());
        }

        link.is_verified = verified;
        self.prefs.put_json(DYNAMIC_LINK_KEY, &link).await?;
        info!(university_id = link.university_id, "Dynamic link marked verified");
        self.dynamic_link.send_replace(Some(link));
        Ok(())
    }

    async fn save_guest_key(&self, key: &GuestKey) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        self.prefs.put_json(GUEST_KEY_KEY, key).await?;
        self.guest_key.send_replace(Some(key.clone()));
        info!("Saved guest key");
        Ok(())
    }

    async fn get_guest_key(&self) -> Option<GuestKey> {
        self.prefs.get_json(GUEST_KEY_KEY).await
    }

    fn watch_guest_key(&self) -> ValueStream<Option<GuestKey>> {
        watch_stream(self.guest_key.subscribe())
    }

    async fn save_verified_account(&self, account: &VerifiedAccount) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut account = account.clone();
        if account.verified && account.verified_at.is_none() {
            account.verified_at = Some(Utc::now());
        }
        self.prefs.put_json(VERIFIED_ACCOUNT_KEY, &account).await?;
        info!(email = %account.email, verified = account.verified, "Saved verified account");
        self.verified_account.send_replace(Some(account));
        Ok(())
    }

    async fn get_verified_account(&self) -> Option<VerifiedAccount> {
        self.prefs.get_json(VERIFIED_ACCOUNT_KEY).await
    }

    fn watch_verified_account(&self) -> ValueStream<Option<VerifiedAccount>> {
        watch_stream(self.verified_account.subscribe())
    }

    async fn set_verification_email_sent(&self, sent: bool) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        self.prefs.put_json(VERIFICATION_EMAIL_KEY, &sent).await?;
        self.verification_email_sent.send_replace(sent);
        Ok(())
    }

    async fn is_verification_email_sent(&self) -> bool {
        self.prefs
            .get_json(VERIFICATION_EMAIL_KEY)
            .await
            .unwrap_or(false)
    }

    fn watch_verification_email_sent(&self) -> ValueStream<bool> {
        watch_stream(self.verification_email_sent.subscribe())
    }

    async fn clear(&self) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        self.prefs.clear().await?;
        self.dynamic_link.send_replace(None);
        self.guest_key.send_replace(None);
        self.verified_account.send_replace(None);
        self.verification_email_sent.send_replace(false);
        info!("Cleared session store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::db::DbAdapter;
    use futures::StreamExt;
    use std::sync::Arc;

    async fn store() -> (DbAdapter, SqliteSessionStore) {
        let db = DbAdapter::open_in_memory().await.unwrap();
        let store = SqliteSessionStore::open(db.pool().clone()).await;
        (db, store)
    }

    #[tokio::test]
    async fn last_saved_link_wins() {
        let (_db, store) = store().await;
        assert_eq!(store.get_dynamic_link().await, None);
        for (id, token) in [(1, "a"), (2, "b"), (3, "c")] {
            store
                .save_dynamic_link(&DynamicLinkState::new(id, token))
                .await
                .unwrap();
        }
        assert_eq!(
            store.get_dynamic_link().await,
            Some(DynamicLinkState::new(3, "c"))
        );
    }

    #[tokio::test]
    async fn verification_update_without_link_is_a_no_op() {
        let (_db, store) = store().await;
        store.update_verification(true).await.unwrap();
        assert_eq!(store.get_dynamic_link().await, None);
    }

    #[tokio::test]
    async fn verification_update_only_touches_the_flag() {
        let (_db, store) = store().await;
        store
            .save_dynamic_link(&DynamicLinkState::new(8, "invite"))
            .await
            .unwrap();
        store.update_verification(true).await.unwrap();
        let link = store.get_dynamic_link().await.unwrap();
        assert_eq!(link.university_id, 8);
        assert_eq!(link.dynamic_token, "invite");
        assert!(link.is_verified);

        store.update_verification(false).await.unwrap();
        assert!(store.get_dynamic_link().await.unwrap().is_verified);
    }

    #[tokio::test]
    async fn concurrent_verification_updates_keep_the_link_intact() {
        let (_db, store) = store().await;
        let store = Arc::new(store);
        store
            .save_dynamic_link(&DynamicLinkState::new(5, "tok"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update_verification(true).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let link = store.get_dynamic_link().await.unwrap();
        assert_eq!(link.dynamic_token, "tok");
        assert!(link.is_verified);
    }

    #[tokio::test]
    async fn watchers_see_current_value_then_updates() {
        let (_db, store) = store().await;
        let mut stream = store.watch_dynamic_link();
        assert_eq!(stream.next().await, Some(None));

        store
            .save_dynamic_link(&DynamicLinkState::new(1, "x"))
            .await
            .unwrap();
        assert_eq!(stream.next().await, Some(Some(DynamicLinkState::new(1, "x"))));

        // A late subscriber starts from the latest value.
        let mut late = store.watch_dynamic_link();
        assert_eq!(late.next().await, Some(Some(DynamicLinkState::new(1, "x"))));
    }

    #[tokio::test]
    async fn reopen_seeds_watchers_from_disk() {
        let (db, store) = store().await;
        store.save_guest_key(&GuestKey("guest-1".into())).await.unwrap();
        drop(store);

        let reopened = SqliteSessionStore::open(db.pool().clone()).await;
        let mut stream = reopened.watch_guest_key();
        assert_eq!(stream.next().await, Some(Some(GuestKey("guest-1".into()))));
    }

    #[tokio::test]
    async fn malformed_values_read_as_absent() {
        let (db, store) = store().await;
        Preferences::new(db.pool().clone(), NAMESPACE)
            .put_raw(VERIFIED_ACCOUNT_KEY, "[1,2")
            .await
            .unwrap();
        assert_eq!(store.get_verified_account().await, None);
    }

    #[tokio::test]
    async fn verified_account_gets_a_timestamp() {
        let (_db, store) = store().await;
        store
            .save_verified_account(&VerifiedAccount {
                email: "ada@pace.edu".into(),
                verified: true,
                verified_at: None,
            })
            .await
            .unwrap();
        let account = store.get_verified_account().await.unwrap();
        assert!(account.verified);
        assert!(account.verified_at.is_some());
    }

    #[tokio::test]
    async fn clear_drops_every_value() {
        let (_db, store) = store().await;
        store
            .save_dynamic_link(&DynamicLinkState::new(1, "x"))
            .await
            .unwrap();
        store.save_guest_key(&GuestKey::generate()).await.unwrap();
        store.set_verification_email_sent(true).await.unwrap();
        let mut flag = store.watch_verification_email_sent();
        assert_eq!(flag.next().await, Some(true));

        store.clear().await.unwrap();
        assert_eq!(store.get_dynamic_link().await, None);
        assert_eq!(store.get_guest_key().await, None);
        assert!(!store.is_verification_email_sent().await);
        assert_eq!(flag.next().await, Some(false));
    }
}
