use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::AnalysisFinished { generation, outcome } => {
            app.finish_analysis(generation, outcome);
        }
    }
}

/// The trigger. Does nothing while a request is outstanding, the same way the
/// button is drawn disabled.
pub fn submit(app: &mut App, tx: &UnboundedSender<AppEvent>) {
    if app.loading {
        debug!("trigger ignored, request already in flight");
        return;
    }

    let pending = app.begin_analysis();
    let client = app.client.clone();
    let tx = tx.clone();

    tokio::spawn(async move {
        let outcome = client.analyze(&pending.request).await;
        // Receiver gone means the app is shutting down
        let _ = tx.send(AppEvent::AnalysisFinished {
            generation: pending.generation,
            outcome,
        });
    });
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    // Global keys that work in any focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('s') => submit(app, tx),
            KeyCode::Char('u') if app.focus == Focus::Text => app.clear_text(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_result_down();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_result_up();
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Text => handle_text_input(app, key),
        Focus::Model => handle_model_select(app, key),
        Focus::Trigger => handle_trigger(app, key, tx),
    }
}

fn handle_text_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.focus = Focus::Trigger,
        KeyCode::Enter => app.insert_char('\n'),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_model_select(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') | KeyCode::Char(' ') => {
            app.toggle_model();
        }
        KeyCode::Enter => app.focus = Focus::Trigger,
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_trigger(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => submit(app, tx),
        KeyCode::Char('i') => app.focus = Focus::Text,
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisClient, AnalysisResult, ModelChoice};
    use crate::error::NO_RESPONSE_MESSAGE;
    use serde_json::json;
    use tokio::sync::mpsc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn app_for(endpoint: &str) -> App {
        App::new(AnalysisClient::new(endpoint), ModelChoice::Custom)
    }

    fn type_text(app: &mut App, tx: &UnboundedSender<AppEvent>, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)), tx);
        }
    }

    #[tokio::test]
    async fn test_submit_round_trip_structured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze/"))
            .and(body_json(json!({"text": "meh", "model": "custom"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"sentiment": "Negative", "confidence": 0.87})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app_for(&format!("{}/analyze/", server.uri()));
        app.error = Some("stale".to_string());

        type_text(&mut app, &tx, "meh");
        handle_event(&mut app, ctrl('s'), &tx);

        // Cleared and busy before the response is processed
        assert!(app.loading);
        assert!(app.error.is_none());
        assert!(app.result.is_none());

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event, &tx);

        assert!(!app.loading);
        assert_eq!(app.result.as_ref().and_then(|r| r.sentiment()).as_deref(), Some("Negative"));
        assert!(app.error.is_none());
    }

    #[tokio::test]
    async fn test_submit_plain_text_with_llama() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"text": "great", "model": "llama"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("Positive")))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app_for(&format!("{}/analyze/", server.uri()));

        type_text(&mut app, &tx, "great");
        handle_event(&mut app, key(KeyCode::Tab), &tx);
        handle_event(&mut app, key(KeyCode::Right), &tx);
        assert_eq!(app.model, ModelChoice::Llama);
        handle_event(&mut app, key(KeyCode::Tab), &tx);
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        assert!(app.loading);

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event, &tx);

        assert_eq!(app.result, Some(AnalysisResult::Text("Positive".to_string())));
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_submit_without_backend_reports_no_response() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app_for(&format!("http://127.0.0.1:{}/analyze/", port));

        handle_event(&mut app, ctrl('s'), &tx);
        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event, &tx);

        assert!(!app.loading);
        assert!(app.result.is_none());
        assert_eq!(app.error.as_deref(), Some(NO_RESPONSE_MESSAGE));
    }

    #[tokio::test]
    async fn test_trigger_ignored_while_loading() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_for("http://127.0.0.1:9/analyze/");

        handle_event(&mut app, ctrl('s'), &tx);
        handle_event(&mut app, ctrl('s'), &tx);

        assert_eq!(app.generation, 1);
    }

    #[tokio::test]
    async fn test_enter_in_text_field_inserts_newline() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_for("http://127.0.0.1:9/analyze/");

        type_text(&mut app, &tx, "a");
        handle_event(&mut app, key(KeyCode::Enter), &tx);
        type_text(&mut app, &tx, "b");

        assert_eq!(app.text, "a\nb");
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_for("http://127.0.0.1:9/analyze/");

        // 'q' is text while the input has focus
        type_text(&mut app, &tx, "q");
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Esc), &tx);
        assert_eq!(app.focus, Focus::Trigger);
        handle_event(&mut app, key(KeyCode::Char('q')), &tx);
        assert!(app.should_quit);
    }
}
