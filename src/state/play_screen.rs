use anyhow::Result;
use tracing::info;

use super::pause_menu::{PauseChoice, PauseMenu};
use crate::database::ScoreStore;
use crate::input::{ConsumerId, DetectionReader, MenuCommand, MenuInput};
use crate::play::{PlayPhase, PlaySession, ResultReporter, SessionResult};
use crate::traits::input::ActionSource;
use crate::traits::render::SpawnSink;

/// Why the play screen handed control back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenExit {
    Finished(SessionResult),
    LevelSelect,
    Title,
    /// The detection state was marked ended (quit request).
    Quit,
}

struct PauseOverlay {
    menu: PauseMenu,
    input: MenuInput,
}

/// Gameplay screen: runs the session, the pause menu and result reporting.
pub struct PlayScreen<A: ActionSource, S: ScoreStore> {
    session: PlaySession,
    input: A,
    reader: Option<DetectionReader>,
    reporter: ResultReporter<S>,
    menu_poll_interval_us: i64,
    overlay: Option<PauseOverlay>,
    queued_commands: Vec<MenuCommand>,
}

impl<A: ActionSource, S: ScoreStore> PlayScreen<A, S> {
    pub const MENU_CONSUMER: ConsumerId = ConsumerId("pause_menu");

    pub fn new(
        session: PlaySession,
        input: A,
        reader: Option<DetectionReader>,
        store: S,
        menu_poll_interval_us: i64,
    ) -> Self {
        Self {
            session,
            input,
            reader,
            reporter: ResultReporter::new(store),
            menu_poll_interval_us,
            overlay: None,
            queued_commands: Vec::new(),
        }
    }

    pub fn session(&self) -> &PlaySession {
        &self.session
    }

    pub fn input_mut(&mut self) -> &mut A {
        &mut self.input
    }

    pub fn store(&self) -> &S {
        self.reporter.store()
    }

    pub fn is_paused(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn pause_selection(&self) -> Option<PauseChoice> {
        self.overlay.as_ref().map(|o| o.menu.selected())
    }

    /// Queue a menu command from the keyboard; applied on the next update
    /// while paused.
    pub fn push_menu_command(&mut self, command: MenuCommand) {
        self.queued_commands.push(command);
    }

    pub fn update(
        &mut self,
        now_us: i64,
        sink: &mut dyn SpawnSink,
    ) -> Result<Option<ScreenExit>> {
        if self.reader.as_ref().is_some_and(DetectionReader::is_ended) {
            info!("Quit requested");
            return Ok(Some(ScreenExit::Quit));
        }

        match self.session.phase() {
            PlayPhase::Ready => {
                self.session.start(now_us);
                Ok(None)
            }
            PlayPhase::Playing => self.update_playing(now_us, sink),
            PlayPhase::Paused => Ok(self.update_paused(now_us)),
            PlayPhase::Finished => Ok(None),
        }
    }

    fn update_playing(
        &mut self,
        now_us: i64,
        sink: &mut dyn SpawnSink,
    ) -> Result<Option<ScreenExit>> {
        let frame = self.input.poll(self.session.effective_time(now_us));
        let outcome = self.session.tick_with(now_us, &frame, sink);

        if let Some(result) = outcome.finished {
            self.reporter.report(&result)?;
            return Ok(Some(ScreenExit::Finished(result)));
        }
        if outcome.paused {
            self.open_pause_menu(now_us);
        }
        Ok(None)
    }

    fn open_pause_menu(&mut self, now_us: i64) {
        let mut input = MenuInput::new(Self::MENU_CONSUMER, self.menu_poll_interval_us, now_us);
        if let Some(reader) = &self.reader {
            input.prime(&reader.snapshot());
        }
        self.queued_commands.clear();
        self.overlay = Some(PauseOverlay {
            menu: PauseMenu::new(),
            input,
        });
    }

    fn update_paused(&mut self, now_us: i64) -> Option<ScreenExit> {
        if self.overlay.is_none() {
            // Paused from outside the screen; resume needs a menu.
            self.open_pause_menu(now_us);
            return None;
        }
        let overlay = self.overlay.as_mut()?;

        let mut commands = std::mem::take(&mut self.queued_commands);
        if let Some(reader) = &self.reader {
            commands.extend(overlay.input.poll(now_us, &reader.snapshot()));
        }

        let choice = commands
            .into_iter()
            .find_map(|command| overlay.menu.apply(command))?;
        info!(choice = choice.label(), "Pause menu choice");
        self.overlay = None;

        match choice {
            PauseChoice::Resume => {
                self.session.resume(now_us);
                None
            }
            PauseChoice::Restart => {
                self.session.restart(now_us);
                self.input.reset();
                self.reporter.rearm();
                None
            }
            PauseChoice::LevelSelect => Some(ScreenExit::LevelSelect),
            PauseChoice::Title => Some(ScreenExit::Title),
        }
    }
}
