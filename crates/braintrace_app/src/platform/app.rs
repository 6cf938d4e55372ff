use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use braintrace_core::{update, AppState, ConversationId, Msg};
use braintrace_engine::{EngineHandle, ReqwestBackend};
use braintrace_logging::{bt_info, bt_warn};
use chrono::Utc;
use url::Url;

use super::commands::{self, Command};
use super::config::{AppConfig, CONFIG_FILENAME};
use super::effects::{EffectRunner, Surface};
use super::graph_view::GraphView;
use super::render;
use super::{logging, persistence};

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_FILENAME))?;
    logging::initialize(config.log_destination);

    let backend = ReqwestBackend::new(config.backend_settings())
        .with_context(|| format!("invalid backend_url {:?}", config.backend_url))?;
    let engine = EngineHandle::new(Arc::new(backend));
    let mut runner = EffectRunner::new(engine, config.full_view_base()?, Box::new(ConsoleSurface));
    let graph = GraphView::mount(runner.bridge_mut());

    let seed = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(1);
    let state = AppState::with_config(config.chat_config()).with_provisional_seed(seed);
    let state_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut session = Session {
        state,
        runner,
        graph,
        state_dir,
        active: None,
    };

    let initial = config
        .initial_conversation()
        .or_else(|| persistence::load_last_conversation(&session.state_dir));
    println!("braintrace: type /help for commands");
    print!(
        "{}",
        render::render(&session.state.view(), &session.graph.snapshot())
    );
    if let Some(id) = initial {
        session.dispatch(Msg::ConversationSelected(id));
    }

    let lines = spawn_stdin_reader();
    loop {
        match lines.recv_timeout(TICK) {
            Ok(line) => match commands::parse(&line, &session.state.view()) {
                Command::Dispatch(msgs) => {
                    for msg in msgs {
                        session.dispatch(msg);
                    }
                }
                Command::GraphClear(kind) => {
                    let msg = session.graph.clear_own(kind);
                    session.dispatch(msg);
                }
                Command::GraphReportNew(names) => {
                    if let Some(msg) = session.graph.report_new(names) {
                        session.dispatch(msg);
                    }
                }
                Command::Help => println!("{}", render::HELP),
                Command::Quit => break,
                Command::Invalid(err) => println!("? {err}"),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        for msg in session.runner.poll() {
            session.dispatch(msg);
        }
    }

    bt_info!("Shutting down with {} requests in flight", session.runner.in_flight());
    session.runner.shutdown();
    Ok(())
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    graph: GraphView,
    state_dir: PathBuf,
    active: Option<ConversationId>,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        if state.conversation() != self.active.as_ref() {
            self.active = state.conversation().cloned();
            match &self.active {
                Some(id) => {
                    braintrace_logging::set_scope(id.as_str());
                    persistence::save_last_conversation(&self.state_dir, id);
                }
                None => braintrace_logging::clear_scope(),
            }
        }

        self.runner.run(effects);

        // The terminal always shows the newest line last.
        let _ = state.consume_scroll_request();
        let was_dirty = state.consume_dirty();
        if was_dirty {
            print!("{}", render::render(&state.view(), &self.graph.snapshot()));
            let _ = io::stdout().flush();
        }
        self.state = state;
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    bt_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
    });
    line_rx
}

/// Prints outward actions; a terminal has no clipboard or browser to hand off to.
struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn copy_text(&mut self, text: &str) -> Result<(), String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "--- copied ---\n{text}\n--------------").map_err(|e| e.to_string())
    }

    fn open_source(&mut self, source_id: &str) {
        println!("open source document {source_id}");
    }

    fn open_url(&mut self, url: &Url) {
        println!("open {url}");
    }
}
