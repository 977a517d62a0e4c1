use uuid::Uuid;

use crate::calculator::{CalculatorState, Input, apply_input};
use crate::config::StorageConfig;
use crate::error::{AuthError, CalculationError, Field, SessionError, ValidationError};
use crate::history::{HistoryRecord, HistoryStore};
use crate::login::{Argon2Hasher, CredentialHasher, User, UserStore};

/// Screen the front end should show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Login,
    Signup,
    Calculator,
}

/// Inline message for the form or keypad that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Everything one interactive session holds between presses
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Correlates log lines of one session
    pub session_id: Uuid,
    pub current_user: Option<String>,
    pub active_view: View,
    pub calculator: CalculatorState,
    /// Current user's records, most recent first
    pub history: Vec<HistoryRecord>,
    pub notice: Option<Notice>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            session_id: Uuid::new_v4(),
            current_user: None,
            active_view: View::Login,
            calculator: CalculatorState::default(),
            history: Vec::new(),
            notice: None,
        }
    }
}

/// Routes form submissions and button presses for one session
///
/// Unauthenticated sessions can only switch between the login and signup
/// views and submit those forms. A successful login moves to the
/// calculator view with a fresh calculator and that user's history.
pub struct SessionController<H: CredentialHasher = Argon2Hasher> {
    users: UserStore,
    history: HistoryStore,
    hasher: H,
    state: SessionState,
}

impl SessionController<Argon2Hasher> {
    /// Open a session backed by the files in `config`, hashing with Argon2
    pub fn open(config: &StorageConfig) -> Self {
        Self::with_hasher(config, Argon2Hasher)
    }
}

impl<H: CredentialHasher> SessionController<H> {
    pub fn with_hasher(config: &StorageConfig, hasher: H) -> Self {
        let state = SessionState::default();
        log::debug!("[{}] session started", state.session_id);
        SessionController {
            users: UserStore::open(&config.users_file),
            history: HistoryStore::open(&config.history_file),
            hasher,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.current_user.is_some()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.state.current_user.as_deref()
    }

    pub fn show_signup(&mut self) {
        if !self.is_authenticated() {
            self.state.active_view = View::Signup;
            self.state.notice = None;
        }
    }

    pub fn show_login(&mut self) {
        if !self.is_authenticated() {
            self.state.active_view = View::Login;
            self.state.notice = None;
        }
    }

    /// Authenticate and switch to the calculator
    ///
    /// # Errors
    /// * `ValidationError::EmptyField` for a blank username or password
    /// * `AuthError::NotFound` / `AuthError::BadCredential` for bad credentials
    ///
    /// The session is unchanged apart from the error notice on failure.
    pub fn submit_login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let outcome = self.login(username, password);
        self.note(&outcome);
        outcome
    }

    fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        require(username, Field::Username)?;
        require(password, Field::Password)?;

        let Some(user) = self.users.find(username) else {
            log::info!("[{}] login failed: unknown user", self.state.session_id);
            return Err(AuthError::NotFound.into());
        };
        if !self.hasher.verify(password, &user.password_hash)? {
            log::info!("[{}] login failed for {}", self.state.session_id, username);
            return Err(AuthError::BadCredential.into());
        }

        self.state.current_user = Some(user.username);
        self.state.active_view = View::Calculator;
        self.state.calculator = CalculatorState::default();
        self.refresh_history();
        self.state.notice = Some(Notice::Success(format!("Welcome back, {}!", username)));
        log::info!("[{}] {} logged in", self.state.session_id, username);
        Ok(())
    }

    /// Create an account and switch to the login view
    ///
    /// The new user is not logged in automatically.
    ///
    /// # Errors
    /// * `ValidationError::EmptyField` for a blank username or password
    /// * `ValidationError::PasswordMismatch` if `confirm` differs from `password`
    /// * `ValidationError::DuplicateUser` if the username is taken
    /// * `StorageError::Unwritable` if the user file cannot be saved
    /// * `SessionError::AlreadyAuthenticated` while someone is logged in; the
    ///   view and user are left as they are
    pub fn submit_signup(
        &mut self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), SessionError> {
        let outcome = self.signup(username, password, confirm);
        self.note(&outcome);
        outcome
    }

    fn signup(&mut self, username: &str, password: &str, confirm: &str) -> Result<(), SessionError> {
        if self.is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated);
        }
        require(username, Field::Username)?;
        require(password, Field::Password)?;
        if password != confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if self.users.exists(username) {
            return Err(ValidationError::DuplicateUser.into());
        }

        let password_hash = self.hasher.hash(password)?;
        self.users.insert(User {
            username: username.to_string(),
            password_hash,
        })?;

        self.state.active_view = View::Login;
        self.state.notice = Some(Notice::Success(format!(
            "Account created successfully for {}",
            username
        )));
        log::info!("[{}] registered {}", self.state.session_id, username);
        Ok(())
    }

    /// Drop the user, calculator and loaded history; persisted history stays
    pub fn logout(&mut self) {
        if let Some(user) = self.state.current_user.take() {
            log::info!("[{}] {} logged out", self.state.session_id, user);
        }
        self.state.active_view = View::Login;
        self.state.calculator = CalculatorState::default();
        self.state.history.clear();
        self.state.notice = None;
    }

    /// Feed one button press to the calculator
    ///
    /// A completed `=` is appended to the history store under the current
    /// user. Arithmetic failures are not session errors: they come back as
    /// `Ok(Some(..))` with the calculator showing the error marker.
    ///
    /// # Errors
    /// * `SessionError::NotAuthenticated` when nobody is logged in
    /// * `StorageError::Unwritable` if the record could not be saved; the
    ///   calculator still shows the result
    pub fn press_button(&mut self, input: Input) -> Result<Option<CalculationError>, SessionError> {
        let Some(username) = self.state.current_user.clone() else {
            let outcome: Result<Option<CalculationError>, SessionError> =
                Err(SessionError::NotAuthenticated);
            self.note(&outcome);
            return outcome;
        };

        let transition = apply_input(&self.state.calculator, input);
        self.state.calculator = transition.state;
        self.state.notice = transition
            .error
            .map(|e| Notice::Error(e.to_string()));

        if let Some(completed) = transition.completed {
            let outcome = self
                .history
                .append(HistoryRecord::new(&username, &completed))
                .map_err(SessionError::from);
            self.note(&outcome);
            outcome?;
            self.refresh_history();
        }

        Ok(transition.error)
    }

    /// Reload the current user's records from the history store
    pub fn refresh_history(&mut self) {
        self.state.history = match &self.state.current_user {
            Some(user) => self.history.list_for(user),
            None => Vec::new(),
        };
    }

    fn note(&mut self, outcome: &Result<impl Sized, SessionError>) {
        if let Err(e) = outcome {
            self.state.notice = Some(Notice::Error(e.to_string()));
        }
    }
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}
