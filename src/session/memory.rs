//! Thread-safe in-memory [`SessionStore`] for single-process deployments and tests.

// self
use crate::{
	_prelude::*,
	auth::SessionId,
	session::{PendingLogin, SessionFuture, SessionStore, SessionStoreError},
};

type SessionMap = Arc<RwLock<HashMap<SessionId, SessionEntry>>>;

#[derive(Clone, Debug)]
struct SessionEntry {
	pending: PendingLogin,
	expires_at: OffsetDateTime,
}

/// Storage backend that keeps pending logins in-process, partitioned by session id.
///
/// Entries expire after the configured TTL. Expired entries are invisible to
/// [`SessionStore::take`] and are swept whenever a new entry is inserted, so memory stays
/// bounded by the login rate times the TTL. Not shareable across replicas.
#[derive(Clone, Debug)]
pub struct MemorySessionStore {
	map: SessionMap,
	ttl: Duration,
}
impl MemorySessionStore {
	/// Default lifetime of a pending login.
	pub const DEFAULT_TTL: Duration = Duration::minutes(10);

	/// Creates a store whose entries live for `ttl`.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { map: Default::default(), ttl }
	}

	/// Number of entries currently held, expired or not.
	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	/// Returns `true` when no entries are held.
	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}

	fn insert_at(
		&self,
		id: SessionId,
		pending: PendingLogin,
		now: OffsetDateTime,
	) -> Result<(), SessionStoreError> {
		let expires_at = now.checked_add(self.ttl).ok_or_else(|| SessionStoreError::Backend {
			message: "session expiry is out of range".into(),
		})?;
		let mut guard = self.map.write();

		guard.retain(|_, entry| entry.expires_at > now);
		guard.insert(id, SessionEntry { pending, expires_at });

		Ok(())
	}

	fn take_at(&self, id: &SessionId, now: OffsetDateTime) -> Option<PendingLogin> {
		self.map
			.write()
			.remove(id)
			.filter(|entry| entry.expires_at > now)
			.map(|entry| entry.pending)
	}
}
impl Default for MemorySessionStore {
	fn default() -> Self {
		Self::with_ttl(Self::DEFAULT_TTL)
	}
}
impl SessionStore for MemorySessionStore {
	fn insert(&self, id: SessionId, pending: PendingLogin) -> SessionFuture<'_, ()> {
		Box::pin(async move { self.insert_at(id, pending, OffsetDateTime::now_utc()) })
	}

	fn take<'a>(&'a self, id: &'a SessionId) -> SessionFuture<'a, Option<PendingLogin>> {
		Box::pin(async move { Ok(self.take_at(id, OffsetDateTime::now_utc())) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::StrategyType;

	fn pending() -> PendingLogin {
		PendingLogin::new(
			StrategyType::new("github").expect("Strategy fixture should be valid."),
			Url::parse("https://login.example.com/github/callback")
				.expect("Callback fixture should parse."),
		)
	}

	#[test]
	fn take_is_single_use() {
		let store = MemorySessionStore::default();
		let id = SessionId::generate();
		let now = OffsetDateTime::now_utc();
		let pending = pending();

		store.insert_at(id.clone(), pending.clone(), now).expect("Insert should succeed.");

		let taken = store.take_at(&id, now).expect("Fresh entry should be returned.");

		assert_eq!(taken.state, pending.state);
		assert!(store.take_at(&id, now).is_none(), "Second take must find nothing.");
	}

	#[test]
	fn expired_entries_are_invisible_and_swept() {
		let store = MemorySessionStore::with_ttl(Duration::minutes(1));
		let stale = SessionId::generate();
		let fresh = SessionId::generate();
		let start = OffsetDateTime::now_utc();

		store.insert_at(stale.clone(), pending(), start).expect("Insert should succeed.");
		store.insert_at(SessionId::generate(), pending(), start).expect("Insert should succeed.");

		assert_eq!(store.len(), 2);
		assert!(store.take_at(&stale, start + Duration::minutes(2)).is_none());

		store
			.insert_at(fresh.clone(), pending(), start + Duration::minutes(2))
			.expect("Insert should succeed.");

		assert_eq!(store.len(), 1, "Insert should sweep expired entries.");
		assert!(store.take_at(&fresh, start + Duration::minutes(2)).is_some());
	}

	#[test]
	fn unrepresentable_expiry_is_rejected_without_storing() {
		let store = MemorySessionStore::with_ttl(Duration::MAX);
		let err = store
			.insert_at(SessionId::generate(), pending(), OffsetDateTime::now_utc())
			.expect_err("Overflowing expiry must be rejected.");

		assert!(matches!(err, SessionStoreError::Backend { .. }));
		assert!(store.is_empty());
	}
}
