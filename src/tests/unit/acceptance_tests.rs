//! Acceptance Workflow Tests

use std::sync::{Arc, Mutex};

use rstest::rstest;

use crate::core::flashcards::store::{MockDeckDirectory, MockFlashcardStore, MockGenerationLog};
use crate::core::flashcards::{AcceptanceInput, AcceptanceWorkflow, AcceptedFlashcardInput, FlashcardError};
use crate::database::{DeckRecord, FlashcardRecord, GenerationRecord, Provenance, StoreError};
use crate::tests::common::{OTHER_USER, TEST_MODEL, TEST_USER};

const GENERATION_ID: &str = "gen-1";

fn generation_owned_by(user_id: &str) -> GenerationRecord {
    GenerationRecord::new(
        GENERATION_ID.to_string(),
        user_id.to_string(),
        TEST_MODEL.to_string(),
        "f".repeat(64),
        1000,
        10,
        420,
    )
}

fn log_with_generation(owner: &'static str) -> MockGenerationLog {
    let mut log = MockGenerationLog::new();
    log.expect_find_generation()
        .returning(move |_| Ok(Some(generation_owned_by(owner))));
    log
}

fn items(n: usize, edited: bool) -> Vec<AcceptedFlashcardInput> {
    (0..n)
        .map(|i| AcceptedFlashcardInput::new(format!("Q{}", i), format!("A{}", i), edited))
        .collect()
}

fn input(flashcards: Vec<AcceptedFlashcardInput>) -> AcceptanceInput {
    AcceptanceInput {
        deck_id: None,
        flashcards,
    }
}

/// Deck directory whose latest deck for the caller is `deck`
fn latest_deck(deck: DeckRecord) -> MockDeckDirectory {
    let mut decks = MockDeckDirectory::new();
    let found = deck.clone();
    decks.expect_find_deck().returning(move |_| Ok(Some(found.clone())));
    decks.expect_most_recent_deck().returning(move |_| Ok(Some(deck.clone())));
    decks
}

fn capturing_store(inserted: Arc<Mutex<Vec<FlashcardRecord>>>) -> MockFlashcardStore {
    let mut store = MockFlashcardStore::new();
    store.expect_deck_for_generation().returning(|_| Ok(None));
    store.expect_insert_flashcards().times(1).returning(move |cards| {
        inserted.lock().unwrap().extend_from_slice(cards);
        Ok(())
    });
    store
}

fn workflow(decks: MockDeckDirectory, log: MockGenerationLog, store: MockFlashcardStore) -> AcceptanceWorkflow {
    AcceptanceWorkflow::new(Arc::new(decks), Arc::new(log), Arc::new(store))
}

// =============================================================================
// Provenance
// =============================================================================

#[rstest]
#[case(false, Provenance::MachineGenerated)]
#[case(true, Provenance::MachineEdited)]
#[tokio::test]
async fn test_provenance_follows_edit_flag(#[case] edited: bool, #[case] expected: Provenance) {
    let inserted = Arc::new(Mutex::new(Vec::new()));
    let deck = DeckRecord::new(TEST_USER, "Biology");
    let workflow = workflow(
        latest_deck(deck.clone()),
        log_with_generation(TEST_USER),
        capturing_store(inserted.clone()),
    );

    let outcome = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(3, edited)))
        .await
        .unwrap();

    assert_eq!(outcome.created_count, 3);
    for card in &outcome.flashcards {
        assert_eq!(card.provenance(), Some(expected));
        assert_eq!(card.generation_id.as_deref(), Some(GENERATION_ID));
        assert_eq!(card.deck_id, deck.id);
        assert_eq!(card.state, "new");
    }
    assert_eq!(inserted.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_mixed_batch_and_trimmed_content() {
    let inserted = Arc::new(Mutex::new(Vec::new()));
    let workflow = workflow(
        latest_deck(DeckRecord::new(TEST_USER, "Biology")),
        log_with_generation(TEST_USER),
        capturing_store(inserted.clone()),
    );

    let batch = vec![
        AcceptedFlashcardInput::new("  What is ATP? ", " Energy currency ", false),
        AcceptedFlashcardInput::new("Edited question", "Edited answer", true),
    ];
    let outcome = workflow.accept(TEST_USER, GENERATION_ID, &input(batch)).await.unwrap();

    assert_eq!(outcome.flashcards[0].front, "What is ATP?");
    assert_eq!(outcome.flashcards[0].back, "Energy currency");
    assert_eq!(outcome.flashcards[0].source, "machine-generated");
    assert_eq!(outcome.flashcards[1].source, "machine-edited");
}

// =============================================================================
// Batch Validation Happens Before Any Store Call
// =============================================================================

#[rstest]
#[case(0)]
#[case(51)]
#[tokio::test]
async fn test_batch_size_rejected_before_insert(#[case] n: usize) {
    let mut store = MockFlashcardStore::new();
    store.expect_insert_flashcards().times(0);

    let workflow = workflow(MockDeckDirectory::new(), MockGenerationLog::new(), store);
    let err = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(n, false)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_fifty_items_accepted() {
    let inserted = Arc::new(Mutex::new(Vec::new()));
    let workflow = workflow(
        latest_deck(DeckRecord::new(TEST_USER, "Biology")),
        log_with_generation(TEST_USER),
        capturing_store(inserted.clone()),
    );

    let outcome = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(50, false)))
        .await
        .unwrap();

    assert_eq!(outcome.created_count, 50);
}

#[tokio::test]
async fn test_field_errors_name_the_item() {
    let workflow = workflow(MockDeckDirectory::new(), MockGenerationLog::new(), MockFlashcardStore::new());
    let mut batch = items(5, false);
    batch[3].front = "x".repeat(201);

    match workflow.accept(TEST_USER, GENERATION_ID, &input(batch)).await {
        Err(FlashcardError::Validation { fields, .. }) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "flashcards[3].front");
        }
        other => panic!("expected validation error, got {:?}", other.map(|o| o.created_count)),
    }
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn test_unknown_generation() {
    let mut log = MockGenerationLog::new();
    log.expect_find_generation().returning(|_| Ok(None));

    let workflow = workflow(MockDeckDirectory::new(), log, MockFlashcardStore::new());
    let err = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(1, false)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "GENERATION_NOT_FOUND");
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn test_foreign_generation_is_forbidden() {
    let workflow = workflow(
        MockDeckDirectory::new(),
        log_with_generation(OTHER_USER),
        MockFlashcardStore::new(),
    );

    let err = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(1, false)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "FORBIDDEN");
}

// =============================================================================
// Deck Resolution
// =============================================================================

#[tokio::test]
async fn test_explicit_deck_must_belong_to_caller() {
    let mut decks = MockDeckDirectory::new();
    decks
        .expect_find_deck()
        .returning(|_| Ok(Some(DeckRecord::new(OTHER_USER, "Theirs"))));

    let workflow = workflow(decks, log_with_generation(TEST_USER), MockFlashcardStore::new());
    let request = AcceptanceInput {
        deck_id: Some("deck-theirs".to_string()),
        flashcards: items(1, false),
    };

    let err = workflow.accept(TEST_USER, GENERATION_ID, &request).await.unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");
}

#[tokio::test]
async fn test_explicit_deck_missing() {
    let mut decks = MockDeckDirectory::new();
    decks.expect_find_deck().returning(|_| Ok(None));

    let workflow = workflow(decks, log_with_generation(TEST_USER), MockFlashcardStore::new());
    let request = AcceptanceInput {
        deck_id: Some("deck-gone".to_string()),
        flashcards: items(1, false),
    };

    let err = workflow.accept(TEST_USER, GENERATION_ID, &request).await.unwrap_err();
    assert_eq!(err.code(), "DECK_NOT_FOUND");
}

#[tokio::test]
async fn test_deck_inferred_from_earlier_acceptance() {
    let earlier = DeckRecord::new(TEST_USER, "Earlier");
    let earlier_id = earlier.id.clone();

    let mut decks = MockDeckDirectory::new();
    decks.expect_find_deck().returning(move |_| Ok(Some(earlier.clone())));
    decks.expect_most_recent_deck().times(0);

    let mut store = MockFlashcardStore::new();
    let inferred = earlier_id.clone();
    store
        .expect_deck_for_generation()
        .returning(move |_| Ok(Some(inferred.clone())));
    store.expect_insert_flashcards().times(1).returning(|_| Ok(()));

    let workflow = workflow(decks, log_with_generation(TEST_USER), store);
    let outcome = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(2, false)))
        .await
        .unwrap();

    assert!(outcome.flashcards.iter().all(|c| c.deck_id == earlier_id));
}

#[tokio::test]
async fn test_no_resolvable_deck() {
    let mut decks = MockDeckDirectory::new();
    decks.expect_most_recent_deck().returning(|_| Ok(None));

    let mut store = MockFlashcardStore::new();
    store.expect_deck_for_generation().returning(|_| Ok(None));
    store.expect_insert_flashcards().times(0);

    let workflow = workflow(decks, log_with_generation(TEST_USER), store);
    let err = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(1, false)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_insert_failure_is_internal() {
    let mut store = MockFlashcardStore::new();
    store.expect_deck_for_generation().returning(|_| Ok(None));
    store
        .expect_insert_flashcards()
        .returning(|_| Err(StoreError::Constraint("FOREIGN KEY constraint failed".into())));

    let workflow = workflow(
        latest_deck(DeckRecord::new(TEST_USER, "Biology")),
        log_with_generation(TEST_USER),
        store,
    );
    let err = workflow
        .accept(TEST_USER, GENERATION_ID, &input(items(1, false)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 500);
    assert!(!err.public_message().contains("FOREIGN KEY"));
}
