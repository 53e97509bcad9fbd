//! Cooking-session integration tests
//!
//! Exercises the classifier, the state machine, and the guide loop with
//! scripted I/O channels — no audio hardware or network involved.

mod common;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use souschef::db::{RecipeRepo, StatsRepo};
use souschef::voice::{IoMode, TurnIo};
use souschef::{
    CommandClassifier, CommandIntent, Error, Guide, Recipe, RecipeSession, SessionStatus,
};

/// Channel that replays a fixed command script and records narration
struct ScriptedIo {
    script: RefCell<VecDeque<String>>,
    spoken: Rc<RefCell<Vec<String>>>,
    listens: Rc<Cell<u32>>,
}

impl ScriptedIo {
    fn new(script: &[&str]) -> (Self, Rc<RefCell<Vec<String>>>, Rc<Cell<u32>>) {
        let spoken = Rc::new(RefCell::new(Vec::new()));
        let listens = Rc::new(Cell::new(0));
        let io = Self {
            script: RefCell::new(script.iter().map(ToString::to_string).collect()),
            spoken: Rc::clone(&spoken),
            listens: Rc::clone(&listens),
        };
        (io, spoken, listens)
    }
}

#[async_trait(?Send)]
impl TurnIo for ScriptedIo {
    async fn listen(&mut self) -> souschef::Result<String> {
        self.listens.set(self.listens.get() + 1);
        self.script.borrow_mut().pop_front().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "script exhausted",
            ))
        })
    }

    async fn speak(&mut self, text: &str) -> souschef::Result<()> {
        self.spoken.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn mode(&self) -> IoMode {
        IoMode::Text
    }
}

/// Channel whose microphone is permanently broken
struct BrokenVoice {
    listens: Rc<Cell<u32>>,
}

#[async_trait(?Send)]
impl TurnIo for BrokenVoice {
    async fn listen(&mut self) -> souschef::Result<String> {
        self.listens.set(self.listens.get() + 1);
        Err(Error::Audio("device unavailable".to_string()))
    }

    async fn speak(&mut self, _text: &str) -> souschef::Result<()> {
        Ok(())
    }

    fn mode(&self) -> IoMode {
        IoMode::Voice
    }
}

fn saved_recipe(steps: usize) -> (Recipe, StatsRepo, String) {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "tester");
    let recipe = RecipeRepo::new(pool.clone())
        .save(&user.id, &common::sample_recipe(steps))
        .unwrap();
    (recipe, StatsRepo::new(pool), user.id)
}

#[tokio::test]
async fn classifier_resolves_spec_examples() {
    let classifier = CommandClassifier::new(None);

    assert_eq!(
        classifier.classify("please repeat that").await,
        CommandIntent::Repeat
    );
    assert_eq!(classifier.classify("what's next").await, CommandIntent::Next);
    assert_eq!(
        classifier.classify("how do I dice an onion").await,
        CommandIntent::Question("how do I dice an onion".to_string())
    );
    assert_eq!(classifier.classify("").await, CommandIntent::Unrecognized);
}

#[test]
fn repeat_never_moves_the_cursor() {
    let mut session = RecipeSession::new(common::sample_recipe(4)).unwrap();
    let arrival = session.step_narration();

    for _ in 0..5 {
        assert_eq!(session.repeat(), arrival);
        assert_eq!(session.step(), 0);
    }

    session.advance();
    let arrival = session.step_narration();
    assert_eq!(session.repeat(), arrival);
    assert_eq!(session.step(), 1);
}

#[test]
fn n_advances_complete_without_overrun() {
    let n = 7;
    let mut session = RecipeSession::new(common::sample_recipe(n)).unwrap();

    for _ in 0..n - 1 {
        session.advance();
        assert_eq!(session.status(), SessionStatus::Active);
    }
    assert_eq!(session.step(), n - 1);

    session.advance();
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.step(), n - 1);
}

#[tokio::test]
async fn stop_aborts_with_exactly_one_store_write() {
    let (recipe, stats, user_id) = saved_recipe(3);
    let recipe_id = recipe.id.clone().unwrap();

    let session = RecipeSession::new(recipe).unwrap();
    let (io, _, _) = ScriptedIo::new(&["stop"]);

    let outcome = Guide::new(
        session,
        CommandClassifier::new(None),
        None,
        Box::new(io),
        None,
    )
    .with_stats(stats.clone(), user_id.clone())
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.status, SessionStatus::Aborted);

    let stat = stats.for_recipe(&user_id, &recipe_id).unwrap().unwrap();
    assert_eq!(stat.sessions, 1);
    assert_eq!(stat.times_cooked, 0);
}

#[tokio::test]
async fn completing_a_session_counts_as_cooked() {
    let (recipe, stats, user_id) = saved_recipe(3);
    let recipe_id = recipe.id.clone().unwrap();

    let session = RecipeSession::new(recipe).unwrap();
    let (io, spoken, _) = ScriptedIo::new(&["next", "next", "next"]);

    let outcome = Guide::new(
        session,
        CommandClassifier::new(None),
        None,
        Box::new(io),
        None,
    )
    .with_stats(stats.clone(), user_id.clone())
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.recipe_id.as_deref(), Some(recipe_id.as_str()));

    let stat = stats.for_recipe(&user_id, &recipe_id).unwrap().unwrap();
    assert_eq!(stat.sessions, 1);
    assert_eq!(stat.times_cooked, 1);

    // Intro, step 1, steps 2 and 3, completion farewell
    let spoken = spoken.borrow();
    assert!(spoken.iter().any(|s| s.contains("Step 1 of 3")));
    assert!(spoken.iter().any(|s| s.contains("All done")));
}

#[tokio::test]
async fn device_failure_downgrades_to_text_permanently() {
    let (recipe, stats, user_id) = saved_recipe(2);

    let session = RecipeSession::new(recipe).unwrap();
    let voice_listens = Rc::new(Cell::new(0));
    let voice = BrokenVoice {
        listens: Rc::clone(&voice_listens),
    };
    let (fallback, _, text_listens) = ScriptedIo::new(&["next", "next"]);

    let outcome = Guide::new(
        session,
        CommandClassifier::new(None),
        None,
        Box::new(voice),
        Some(Box::new(fallback)),
    )
    .with_stats(stats, user_id)
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.status, SessionStatus::Completed);

    // Voice was tried exactly once; every later turn went to the console
    assert_eq!(voice_listens.get(), 1);
    assert_eq!(text_listens.get(), 2);
}

/// Channel whose speaker is broken: narration fails, listening would work
struct MuteVoice {
    listens: Rc<Cell<u32>>,
}

#[async_trait(?Send)]
impl TurnIo for MuteVoice {
    async fn listen(&mut self) -> souschef::Result<String> {
        self.listens.set(self.listens.get() + 1);
        Ok("next".to_string())
    }

    async fn speak(&mut self, _text: &str) -> souschef::Result<()> {
        Err(Error::Audio("speaker unavailable".to_string()))
    }

    fn mode(&self) -> IoMode {
        IoMode::Voice
    }
}

#[tokio::test]
async fn narration_failure_also_downgrades() {
    let (recipe, stats, user_id) = saved_recipe(2);

    let session = RecipeSession::new(recipe).unwrap();
    let voice_listens = Rc::new(Cell::new(0));
    let voice = MuteVoice {
        listens: Rc::clone(&voice_listens),
    };
    let (fallback, spoken, text_listens) = ScriptedIo::new(&["next", "next"]);

    let outcome = Guide::new(
        session,
        CommandClassifier::new(None),
        None,
        Box::new(voice),
        Some(Box::new(fallback)),
    )
    .with_stats(stats, user_id)
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.status, SessionStatus::Completed);

    // The intro narration already fails, so the voice mic is never used
    assert_eq!(voice_listens.get(), 0);
    assert_eq!(text_listens.get(), 2);
    assert!(spoken.borrow().iter().any(|s| s.contains("All done")));
}

#[tokio::test]
async fn odd_input_never_derails_the_session() {
    let (recipe, stats, user_id) = saved_recipe(2);
    let recipe_id = recipe.id.clone().unwrap();

    let session = RecipeSession::new(recipe).unwrap();
    // Empty input is unrecognized; a question without an LLM gets the
    // apology; the session stays Active through both
    let (io, spoken, _) = ScriptedIo::new(&["", "how hot should the pan be", "next", "next"]);

    let outcome = Guide::new(
        session,
        CommandClassifier::new(None),
        None,
        Box::new(io),
        None,
    )
    .with_stats(stats.clone(), user_id.clone())
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.status, SessionStatus::Completed);
    let spoken = spoken.borrow();
    assert!(spoken.iter().any(|s| s.contains("didn't catch")));
    assert!(spoken.iter().any(|s| s.contains("trouble answering")));

    let stat = stats.for_recipe(&user_id, &recipe_id).unwrap().unwrap();
    assert_eq!(stat.sessions, 1);
}

#[tokio::test]
async fn unsaved_recipe_skips_stats() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "tester");
    let stats = StatsRepo::new(pool);

    // Recipe never saved: no id, so no stats row can be written
    let session = RecipeSession::new(common::sample_recipe(1)).unwrap();
    let (io, _, _) = ScriptedIo::new(&["next"]);

    let outcome = Guide::new(
        session,
        CommandClassifier::new(None),
        None,
        Box::new(io),
        None,
    )
    .with_stats(stats.clone(), user.id.clone())
    .run()
    .await
    .unwrap();

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert!(outcome.recipe_id.is_none());
    assert_eq!(stats.user_stats(&user.id).unwrap().sessions, 0);
}
