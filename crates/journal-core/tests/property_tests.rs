//! Property-based tests for journal-core
//!
//! Covers token integrity, id assignment, search scoping and password
//! hashing using proptest.

use std::sync::Arc;

use journal_core::{
    password::{hash_password, verify_password},
    AuthService, CredentialStore, InMemoryCredentialStore, InMemoryJournalStore, JournalDraft,
    JournalService, JournalStore, TokenSigner, DEFAULT_SESSION_TTL,
};
use proptest::prelude::*;

const SECRET: &str = "property-test-secret";

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn services() -> (AuthService, JournalService) {
    let credentials: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
    let store: Arc<dyn JournalStore> = Arc::new(InMemoryJournalStore::new());
    let signer = TokenSigner::new(SECRET, DEFAULT_SESSION_TTL).unwrap();

    (
        AuthService::new(credentials.clone(), signer),
        JournalService::new(store, credentials),
    )
}

fn username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // ============================================================
    // Session Tokens
    // ============================================================

    #[test]
    fn issued_tokens_verify_until_expiry(
        user in username(),
        issued_at in 0u64..4_000_000_000,
        ttl in 1u64..100_000,
        offset in 0u64..200_000,
    ) {
        let signer = TokenSigner::new(SECRET, ttl).unwrap();
        let issued = signer.issue_at(&user, issued_at).unwrap();

        let result = signer.verify_at(&issued.token, issued_at + offset);
        if offset < ttl {
            let claims = result.unwrap();
            prop_assert_eq!(claims.sub, user);
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn any_single_character_change_is_rejected(
        user in username(),
        position in any::<prop::sample::Index>(),
        replacement in "[A-Za-z0-9_.-]",
    ) {
        let signer = TokenSigner::new(SECRET, DEFAULT_SESSION_TTL).unwrap();
        let token = signer.issue_at(&user, 1_000).unwrap().token;

        let idx = position.index(token.len());
        let replacement = replacement.chars().next().unwrap();
        prop_assume!(token.as_bytes()[idx] as char != replacement);

        let mut tampered: Vec<char> = token.chars().collect();
        tampered[idx] = replacement;
        let tampered: String = tampered.into_iter().collect();

        prop_assert!(signer.verify_at(&tampered, 1_000).is_err());
    }

    // ============================================================
    // Journal Ids
    // ============================================================

    #[test]
    fn ids_are_increasing_and_never_reused(
        creates in 1usize..20,
        deletes in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
        more in 1usize..10,
    ) {
        let rt = runtime();
        rt.block_on(async {
            let (auth, journals) = services();
            auth.register("alice", "pw").await.unwrap();
            let token = auth.login("alice", "pw").await.unwrap().token;
            let alice = auth.authenticate(Some(&token)).unwrap();

            let mut seen = Vec::new();
            for i in 0..creates {
                let j = journals
                    .create(&alice, JournalDraft::new(format!("entry {}", i), "c"))
                    .await
                    .unwrap();
                seen.push(j.id);
            }

            for idx in deletes {
                let id = seen[idx.index(seen.len())];
                let _ = journals.delete(&alice, id).await;
            }

            for i in 0..more {
                let j = journals
                    .create(&alice, JournalDraft::new(format!("later {}", i), "c"))
                    .await
                    .unwrap();
                seen.push(j.id);
            }

            prop_assert!(seen.windows(2).all(|w| w[0] < w[1]));
            Ok(())
        })?;
    }

    // ============================================================
    // Search
    // ============================================================

    #[test]
    fn search_matches_case_insensitively_and_only_own_records(
        prefix in "[a-z ]{0,8}",
        needle in "[a-zA-Z]{1,6}",
        suffix in "[a-z ]{0,8}",
    ) {
        let rt = runtime();
        rt.block_on(async {
            let (auth, journals) = services();
            auth.register("alice", "pw").await.unwrap();
            auth.register("bob", "pw").await.unwrap();
            let alice_token = auth.login("alice", "pw").await.unwrap().token;
            let bob_token = auth.login("bob", "pw").await.unwrap().token;
            let alice = auth.authenticate(Some(&alice_token)).unwrap();
            let bob = auth.authenticate(Some(&bob_token)).unwrap();

            let title = format!("{}{}{}", prefix, needle.to_lowercase(), suffix);
            journals.create(&alice, JournalDraft::new(title.clone(), "c")).await.unwrap();
            journals.create(&bob, JournalDraft::new(title, "c")).await.unwrap();

            let upper = journals.search(&alice, Some(&needle.to_uppercase())).await.unwrap();
            prop_assert_eq!(upper.len(), 1);
            prop_assert_eq!(upper[0].owner.as_str(), "alice");
            Ok(())
        })?;
    }
}

proptest! {
    // Argon2 is deliberately slow
    #![proptest_config(ProptestConfig::with_cases(4))]

    // ============================================================
    // Password Hashing
    // ============================================================

    #[test]
    fn hash_verifies_only_the_original_password(
        password in "[ -~]{1,32}",
        other in "[ -~]{1,32}",
    ) {
        let hash = hash_password(&password).unwrap();
        prop_assert!(verify_password(&password, &hash));
        if other != password {
            prop_assert!(!verify_password(&other, &hash));
        }
    }
}

// ============================================================
// Unit Tests (non-property)
// ============================================================

#[test]
fn registering_twice_conflicts_regardless_of_password() {
    runtime().block_on(async {
        let (auth, _) = services();
        auth.register("alice", "pw1").await.unwrap();

        for pw in ["pw1", "pw2", "something else"] {
            let err = auth.register("alice", pw).await.unwrap_err();
            assert!(matches!(err, journal_core::Error::Conflict(_)));
        }
    });
}
