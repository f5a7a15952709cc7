use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use carebridge_core::api::{AckReply, ChatReply, CreatePatientReply, Envelope, SystemStats};
use carebridge_core::chat::QUICK_MESSAGES;
use carebridge_core::connectivity;
use carebridge_core::dashboard::{FormField, MedicationPart};
use carebridge_core::{
    ApiError, CareApi, ChatSession, Config, ConnectivityMonitor, Dashboard, HttpClient, LoginForm,
    LoginMode, Notice, PatientDraft, Session, Toasts, ValidationError,
};

use crate::clipboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFocus {
    Form,
    Patients,
}

/// Buffer the keyboard is typing into while in `InputMode::Editing`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    LoginPatientId,
    LoginPassword,
    LoginToken,
    Form(FormField),
    NewPatient,
    Instruction(String),
    ChatInput,
}

/// One selectable line of the patient form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSlot {
    Field(FormField),
    Submit,
}

/// A request running in the background, plus what is needed to settle it
pub enum Pending {
    Login(JoinHandle<Result<Session, ApiError>>),
    Logout(JoinHandle<Result<(), ApiError>>),
    CreatePatient {
        draft: PatientDraft,
        task: JoinHandle<Result<CreatePatientReply, ApiError>>,
    },
    Instruction {
        patient: String,
        task: JoinHandle<Result<AckReply, ApiError>>,
    },
    Delete(JoinHandle<Result<AckReply, ApiError>>),
    RefreshContext {
        patient: String,
        task: JoinHandle<Result<AckReply, ApiError>>,
    },
    ClearAlerts(JoinHandle<Result<AckReply, ApiError>>),
    Stats(JoinHandle<Result<SystemStats, ApiError>>),
    Chat(JoinHandle<Result<ChatReply, ApiError>>),
    Health(JoinHandle<bool>),
}

impl Pending {
    /// Requests whose result belongs to the signed-in user
    fn is_session_bound(&self) -> bool {
        !matches!(self, Pending::Logout(_) | Pending::Health(_))
    }

    fn abort(&self) {
        match self {
            Pending::Login(task) => task.abort(),
            Pending::Logout(task) => task.abort(),
            Pending::CreatePatient { task, .. } => task.abort(),
            Pending::Instruction { task, .. } => task.abort(),
            Pending::Delete(task) => task.abort(),
            Pending::RefreshContext { task, .. } => task.abort(),
            Pending::ClearAlerts(task) => task.abort(),
            Pending::Stats(task) => task.abort(),
            Pending::Chat(task) => task.abort(),
            Pending::Health(task) => task.abort(),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Pending::Login(task) => task.is_finished(),
            Pending::Logout(task) => task.is_finished(),
            Pending::CreatePatient { task, .. } => task.is_finished(),
            Pending::Instruction { task, .. } => task.is_finished(),
            Pending::Delete(task) => task.is_finished(),
            Pending::RefreshContext { task, .. } => task.is_finished(),
            Pending::ClearAlerts(task) => task.is_finished(),
            Pending::Stats(task) => task.is_finished(),
            Pending::Chat(task) => task.is_finished(),
            Pending::Health(task) => task.is_finished(),
        }
    }
}

/// A panicked request task is reported like any other failed request
fn joined<T>(result: Result<Result<T, ApiError>, JoinError>) -> Result<T, ApiError> {
    result.unwrap_or_else(|e| Err(ApiError::Rejected(format!("Request task failed: {}", e))))
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub edit_target: Option<EditTarget>,
    pub session: Option<Session>,

    // Login state
    pub login: LoginForm,
    pub login_state: ListState,

    // Nurse dashboard state
    pub dashboard: Dashboard,
    pub dashboard_focus: DashboardFocus,
    pub form_cursor: usize,
    pub roster_state: ListState,
    pub new_patient: String,

    // Patient chat state
    pub chat: ChatSession,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Ephemeral UI
    pub toasts: Toasts,
    pub notices: VecDeque<Notice>,
    pub connectivity: ConnectivityMonitor,

    // Delete modal area for mouse hit-testing (updated during render)
    pub modal_area: Option<Rect>,

    // Data
    pub config: Config,
    pub server_url: String,
    pub api: Arc<dyn CareApi>,
    pub pending: Vec<Pending>,
}

impl App {
    pub fn new(config: Config, base_url: &str) -> anyhow::Result<Self> {
        let client = HttpClient::new(base_url)?;
        Ok(Self::with_api(config, base_url, Arc::new(client)))
    }

    pub fn with_api(config: Config, server_url: &str, api: Arc<dyn CareApi>) -> Self {
        let login = LoginForm::with_patient_id(config.last_patient_id.clone());

        let mut login_state = ListState::default();
        login_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Login,
            input_mode: InputMode::Normal,
            edit_target: None,
            session: None,

            login,
            login_state,

            dashboard: Dashboard::new(),
            dashboard_focus: DashboardFocus::Form,
            form_cursor: 0,
            roster_state: ListState::default(),
            new_patient: String::new(),

            chat: ChatSession::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            toasts: Toasts::new(),
            notices: VecDeque::new(),
            connectivity: ConnectivityMonitor::new(),

            modal_area: None,

            config,
            server_url: server_url.to_string(),
            api,
            pending: Vec::new(),
        }
    }

    // Notices
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    fn reject(&mut self, err: ValidationError) {
        self.push_notice(Notice::warning(err.to_string()));
    }

    pub fn show_toast(&mut self, message: &str) {
        let duration = self.config.toast_duration();
        self.toasts.show_for(message, duration, Instant::now());
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.iter().all(|p| matches!(p, Pending::Health(_) | Pending::Stats(_)))
    }

    // Editing
    pub fn start_editing(&mut self, target: EditTarget) {
        self.edit_target = Some(target);
        self.input_mode = InputMode::Editing;
    }

    pub fn stop_editing(&mut self) {
        self.edit_target = None;
        self.input_mode = InputMode::Normal;
    }

    /// Apply a keystroke to whatever buffer is being edited
    pub fn edit_buffer(&mut self, apply: impl FnOnce(&mut String)) {
        let Some(target) = self.edit_target.clone() else {
            return;
        };
        match target {
            EditTarget::LoginPatientId => apply(&mut self.login.patient_id),
            EditTarget::LoginPassword => apply(&mut self.login.password),
            EditTarget::LoginToken => apply(&mut self.login.token),
            EditTarget::Form(field) => self.dashboard.form.edit(field, apply),
            EditTarget::NewPatient => apply(&mut self.new_patient),
            EditTarget::Instruction(patient) => apply(self.dashboard.instructions.text_mut(&patient)),
            EditTarget::ChatInput => apply(&mut self.chat.input),
        }
    }

    // Login
    pub fn selected_login_mode(&self) -> LoginMode {
        self.login_state
            .selected()
            .and_then(|i| LoginMode::all().get(i).copied())
            .unwrap_or_default()
    }

    pub fn login_nav(&mut self, down: bool) {
        let count = LoginMode::all().len();
        let current = self.login_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(count - 1)
        } else {
            current.saturating_sub(1)
        };
        self.login_state.select(Some(next));
    }

    /// Pick a login mode; the nurse logs in straight away, patients fill in
    /// their credentials first
    pub fn choose_login_mode(&mut self, mode: LoginMode) {
        self.login.mode = mode;
        if let Some(i) = LoginMode::all().iter().position(|m| *m == mode) {
            self.login_state.select(Some(i));
        }
        match mode {
            LoginMode::Nurse => self.submit_login(),
            LoginMode::PatientPassword => {
                let target = if self.login.patient_id.is_empty() {
                    EditTarget::LoginPatientId
                } else {
                    EditTarget::LoginPassword
                };
                self.start_editing(target);
            }
            LoginMode::PatientToken => self.start_editing(EditTarget::LoginToken),
        }
    }

    pub fn submit_login(&mut self) {
        if self.pending.iter().any(|p| matches!(p, Pending::Login(_))) {
            return self.reject(ValidationError::Busy);
        }
        let request = match self.login.request() {
            Ok(request) => request,
            Err(e) => return self.reject(e),
        };
        self.login.clear_secrets();
        self.stop_editing();

        // The login must not share the cookie jar with a logout still in flight
        let logout = self.take_pending_logout();
        let api = Arc::clone(&self.api);
        self.pending.push(Pending::Login(tokio::spawn(async move {
            if let Some(logout) = logout {
                let _ = logout.await;
            }
            request.send(api.as_ref()).await
        })));
    }

    fn take_pending_logout(&mut self) -> Option<JoinHandle<Result<(), ApiError>>> {
        let index = self.pending.iter().position(|p| matches!(p, Pending::Logout(_)))?;
        match self.pending.remove(index) {
            Pending::Logout(task) => Some(task),
            _ => None,
        }
    }

    fn enter_session(&mut self, session: Session) {
        match &session {
            Session::Nurse => {
                info!("Opening nurse dashboard");
                self.screen = Screen::Dashboard;
                self.stop_editing();
                self.refresh_stats();
            }
            Session::Patient { patient_id } => {
                info!(patient_id = %patient_id, "Opening patient chat");
                if let Err(e) = Config::save_last_patient_id(patient_id) {
                    warn!(error = %e, "Could not remember patient id");
                }
                self.config.last_patient_id = Some(patient_id.clone());
                self.screen = Screen::Chat;
                self.start_editing(EditTarget::ChatInput);
            }
        }
        self.session = Some(session);
    }

    pub fn logout(&mut self) {
        // Nothing started by this user may settle into the next session
        let (stale, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(Pending::is_session_bound);
        for task in &stale {
            task.abort();
        }
        if !stale.is_empty() {
            info!(dropped = stale.len(), "Dropped requests from the closed session");
        }
        self.pending = kept;

        let api = Arc::clone(&self.api);
        self.pending
            .push(Pending::Logout(tokio::spawn(async move { api.logout().await })));

        self.session = None;
        self.screen = Screen::Login;
        self.stop_editing();
        self.dashboard = Dashboard::new();
        self.form_cursor = 0;
        self.roster_state.select(None);
        self.chat = ChatSession::new();
        self.chat_scroll = 0;
        self.modal_area = None;
    }

    // Patient form
    pub fn form_slots(&self) -> Vec<FormSlot> {
        let mut slots: Vec<FormSlot> = [
            FormField::Name,
            FormField::Email,
            FormField::PatientId,
            FormField::Conditions,
            FormField::Allergies,
            FormField::DischargePlan,
        ]
        .into_iter()
        .map(FormSlot::Field)
        .collect();

        for row in 0..self.dashboard.form.medications.len() {
            for part in [MedicationPart::Name, MedicationPart::Dosage, MedicationPart::Frequency] {
                slots.push(FormSlot::Field(FormField::Medication { row, part }));
            }
        }

        slots.push(FormSlot::Submit);
        slots
    }

    pub fn selected_slot(&self) -> FormSlot {
        let slots = self.form_slots();
        let last = slots.len() - 1;
        slots[self.form_cursor.min(last)]
    }

    pub fn form_nav(&mut self, down: bool) {
        let last = self.form_slots().len() - 1;
        self.form_cursor = if down {
            (self.form_cursor + 1).min(last)
        } else {
            self.form_cursor.saturating_sub(1)
        };
    }

    pub fn activate_form_slot(&mut self) {
        match self.selected_slot() {
            FormSlot::Field(field) => self.start_editing(EditTarget::Form(field)),
            FormSlot::Submit => self.submit_form(),
        }
    }

    pub fn add_medication(&mut self) {
        self.dashboard.form.add_medication();
        // Jump to the new row's name
        self.form_cursor = self.form_slots().len() - 4;
    }

    pub fn remove_selected_medication(&mut self) {
        if let FormSlot::Field(FormField::Medication { row, .. }) = self.selected_slot() {
            self.dashboard.form.remove_medication(row);
            self.form_cursor = self.form_cursor.min(self.form_slots().len() - 1);
        }
    }

    pub fn submit_form(&mut self) {
        let draft = match self.dashboard.form.begin_submit() {
            Ok(draft) => draft,
            Err(e) => return self.reject(e),
        };

        let api = Arc::clone(&self.api);
        let body = draft.clone();
        let task = tokio::spawn(async move { api.create_patient(&body).await });
        self.pending.push(Pending::CreatePatient { draft, task });
    }

    // Roster, instructions and delete
    pub fn selected_patient(&self) -> Option<String> {
        self.roster_state
            .selected()
            .and_then(|i| self.dashboard.roster().get(i))
            .cloned()
    }

    pub fn roster_nav(&mut self, down: bool) {
        let count = self.dashboard.roster().len();
        if count == 0 {
            self.roster_state.select(None);
            return;
        }
        let next = match self.roster_state.selected() {
            Some(i) if down => (i + 1).min(count - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.roster_state.select(Some(next));
    }

    fn sync_roster_selection(&mut self) {
        let count = self.dashboard.roster().len();
        let selected = match self.roster_state.selected() {
            _ if count == 0 => None,
            Some(i) => Some(i.min(count - 1)),
            None => Some(0),
        };
        self.roster_state.select(selected);
    }

    pub fn commit_new_patient(&mut self) {
        let name = std::mem::take(&mut self.new_patient);
        if self.dashboard.add_patient(&name) {
            self.roster_state.select(Some(self.dashboard.roster().len() - 1));
        }
        self.stop_editing();
    }

    pub fn send_instruction(&mut self, patient: &str) {
        let instruction = match self.dashboard.instructions.begin_send(patient) {
            Ok(instruction) => instruction,
            Err(e) => return self.reject(e),
        };
        self.stop_editing();

        let api = Arc::clone(&self.api);
        let name = patient.to_string();
        let task = tokio::spawn(async move { api.send_instruction(&name, &instruction).await });
        self.pending.push(Pending::Instruction {
            patient: patient.to_string(),
            task,
        });
    }

    pub fn open_delete_modal(&mut self) {
        if let Some(patient) = self.selected_patient() {
            self.dashboard.delete.open(&patient);
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(target) = self.dashboard.delete.confirm() else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.pending
            .push(Pending::Delete(tokio::spawn(async move { api.delete_patient(&target).await })));
    }

    pub fn refresh_context(&mut self) {
        let Some(patient) = self.selected_patient() else {
            return;
        };
        let api = Arc::clone(&self.api);
        let name = patient.clone();
        let task = tokio::spawn(async move { api.refresh_patient_context(&name).await });
        self.pending.push(Pending::RefreshContext { patient, task });
    }

    pub fn clear_alerts(&mut self) {
        let api = Arc::clone(&self.api);
        self.pending
            .push(Pending::ClearAlerts(tokio::spawn(async move { api.clear_alerts().await })));
    }

    pub fn refresh_stats(&mut self) {
        if self.pending.iter().any(|p| matches!(p, Pending::Stats(_))) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.pending
            .push(Pending::Stats(tokio::spawn(async move { api.system_stats().await })));
    }

    // Patient chat
    pub fn send_chat(&mut self) {
        match self.chat.begin_send(Instant::now()) {
            Ok(message) => self.spawn_chat(message),
            Err(e) => self.reject(e),
        }
    }

    pub fn quick_message(&mut self, index: usize) {
        let Some(preset) = QUICK_MESSAGES.get(index) else {
            return;
        };
        match self.chat.quick_message(preset, Instant::now()) {
            Ok(message) => self.spawn_chat(message),
            Err(e) => self.reject(e),
        }
    }

    fn spawn_chat(&mut self, message: String) {
        let api = Arc::clone(&self.api);
        self.pending
            .push(Pending::Chat(tokio::spawn(async move { api.send_message(&message).await })));
        self.scroll_chat_to_bottom();
    }

    pub fn copy_last_message(&mut self) {
        let Some(text) = self.chat.last_message().map(|m| m.content.clone()) else {
            return;
        };
        if clipboard::copy(&text) {
            self.show_toast("Message copied to clipboard");
        } else {
            self.show_toast("Clipboard is not available");
        }
    }

    /// Scroll the transcript so the newest line (or the typing line) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in self.chat.transcript() {
            total_lines += 1; // Role line
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                total_lines += (char_count / wrap_width) + 1;
            }
            total_lines += 1; // Blank line after message
        }
        if self.chat.typing.is_visible() {
            total_lines += 1;
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        let overflow = total_lines.saturating_sub(visible_height as usize);
        self.chat_scroll = u16::try_from(overflow).unwrap_or(u16::MAX);
    }

    // Background work
    pub fn start_health_probe(&mut self) {
        if self.pending.iter().any(|p| matches!(p, Pending::Health(_))) {
            return;
        }
        let api = Arc::clone(&self.api);
        self.pending.push(Pending::Health(tokio::spawn(async move {
            connectivity::probe(api.as_ref()).await
        })));
    }

    /// Advance timers (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        self.chat.typing.advance(now);
        self.toasts.prune(now);
    }

    /// Settle every request whose task has completed
    pub async fn poll_tasks(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let mut still_running = Vec::with_capacity(pending.len());
        let mut finished = Vec::new();

        for task in pending {
            if task.is_finished() {
                finished.push(task);
            } else {
                still_running.push(task);
            }
        }
        self.pending = still_running;

        for task in finished {
            self.settle(task).await;
        }
    }

    async fn settle(&mut self, task: Pending) {
        match task {
            Pending::Login(task) => match joined(task.await) {
                Ok(session) => self.enter_session(session),
                Err(ApiError::Rejected(reason)) => self.push_notice(Notice::error(reason)),
                Err(e) => self.push_notice(Notice::error(format!("Login failed: {}", e))),
            },
            Pending::Logout(task) => {
                if let Err(e) = joined(task.await) {
                    warn!(error = %e, "Logout request failed");
                }
            }
            Pending::CreatePatient { draft, task } => {
                let outcome = self.dashboard.form.finish_submit(&draft, joined(task.await));
                self.dashboard.apply_submit(&outcome);
                if outcome.created.is_some() {
                    self.form_cursor = 0;
                    self.refresh_stats();
                }
                self.sync_roster_selection();
                self.push_notice(outcome.notice);
            }
            Pending::Instruction { patient, task } => {
                let notice = self.dashboard.instructions.finish_send(&patient, joined(task.await));
                self.push_notice(notice);
            }
            Pending::Delete(task) => {
                let Some(outcome) = self.dashboard.delete.finish(joined(task.await)) else {
                    return;
                };
                self.dashboard.apply_delete(&outcome);
                if outcome.deleted.is_some() {
                    self.refresh_stats();
                }
                self.sync_roster_selection();
                self.modal_area = None;
                self.push_notice(outcome.notice);
            }
            Pending::RefreshContext { patient, task } => {
                match joined(task.await).and_then(Envelope::into_result) {
                    Ok(reply) => {
                        let text = reply
                            .message
                            .unwrap_or_else(|| format!("Context refreshed for {}", patient));
                        self.push_notice(Notice::success(text));
                    }
                    Err(e) => self.push_notice(Notice::error(format!("Error: {}", e))),
                }
            }
            Pending::ClearAlerts(task) => match joined(task.await).and_then(Envelope::into_result) {
                Ok(_) => {
                    self.show_toast("Alerts cleared");
                    self.refresh_stats();
                }
                Err(e) => self.push_notice(Notice::error(format!("Error: {}", e))),
            },
            Pending::Stats(task) => match joined(task.await) {
                Ok(stats) => self.dashboard.stats = Some(stats),
                Err(e) => warn!(error = %e, "Could not load system stats"),
            },
            Pending::Chat(task) => {
                self.chat.finish_send(joined(task.await));
                self.scroll_chat_to_bottom();
            }
            Pending::Health(task) => {
                let online = task.await.unwrap_or(false);
                if let Some(change) = self.connectivity.observe(online) {
                    let duration = change
                        .toast_duration()
                        .unwrap_or_else(|| self.config.toast_duration());
                    self.toasts.show_for(change.message(), duration, Instant::now());
                }
            }
        }
    }
}
