// std
use std::sync::Arc;
// self
use tiku_client::{
	auth::{CallerClass, Session, TokenSecret, UserProfile},
	store::{MemoryStore, SessionStore},
};

fn profile(username: &str) -> UserProfile {
	UserProfile { username: Some(username.into()), ..UserProfile::default() }
}

#[tokio::test]
async fn save_and_load_round_trip() {
	let store = MemoryStore::default();
	let session = Session::with_token("access-1").with_user(profile("alice"));

	store.save(session.clone()).await.expect("Saving a session into memory should succeed.");

	let loaded = store.load().await.expect("Loading the session from memory should succeed.");

	assert_eq!(loaded, session);
	assert_eq!(loaded.caller_class(), CallerClass::Registered);
}

#[tokio::test]
async fn replace_token_keeps_the_profile() {
	let store = MemoryStore::with_session(Session::with_token("old").with_user(profile("bob")));

	store
		.replace_token(TokenSecret::new("new"))
		.await
		.expect("Replacing the token should succeed.");

	let loaded = store.snapshot();

	assert_eq!(loaded.token.as_ref().map(TokenSecret::expose), Some("new"));
	assert_eq!(loaded.user, Some(profile("bob")));
}

#[tokio::test]
async fn clear_turns_the_caller_into_a_guest() {
	let store = MemoryStore::with_session(Session::with_token("short-lived"));
	let shared: Arc<dyn SessionStore> = Arc::new(store.clone());

	shared.clear().await.expect("Clearing the session should succeed.");

	assert_eq!(store.snapshot(), Session::default());
	assert_eq!(store.snapshot().caller_class(), CallerClass::Guest);
}
