use serde::Serialize;

use charterdesk_auth::{
    match_route, visible_entries, GuardState, NavEntry, RouteMatch, RouteSpec, SessionProvider,
    SessionState, NAV_ENTRIES,
};

use crate::board::{parse_flights, FlightBoard};
use crate::config::DashboardConfig;

/// What the host should show for a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    /// Session check in flight.
    Loading,
    /// Replace the current location.
    Redirect { to: String },
    /// Stay on the path and show the message.
    AccessDenied { message: String },
    Render { path: String },
}

/// The flight board, or the screen shown instead of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum FlightBoardView {
    Blocked { screen: Screen },
    Ready { board: FlightBoard },
}

pub struct Dashboard<P> {
    config: DashboardConfig,
    sessions: P,
}

/// Install logging from `config` and build the dashboard.
pub fn bootstrap<P: SessionProvider>(config: DashboardConfig, sessions: P) -> Dashboard<P> {
    charterdesk_observability::tracing::init(&config.log);
    tracing::info!(api = %config.api_base_url, "dashboard ready");
    Dashboard::new(config, sessions)
}

impl<P: SessionProvider> Dashboard<P> {
    pub fn new(config: DashboardConfig, sessions: P) -> Self {
        Self { config, sessions }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn sessions(&self) -> &P {
        &self.sessions
    }

    /// Sidebar entries for whoever is signed in right now.
    pub fn sidebar(&self) -> Vec<NavEntry> {
        visible_entries(&NAV_ENTRIES, self.sessions.state().user())
    }

    /// Resolve a navigation to a screen, guarding protected routes.
    ///
    /// Unknown paths are sent to the dashboard home, but only after the
    /// session check: anonymous visitors still go to login first.
    pub fn open(&self, path: &str) -> Screen {
        let state = self.sessions.state();
        match match_route(path, &self.config.login_path) {
            RouteMatch::Login => Screen::Render {
                path: self.config.login_path.clone(),
            },
            RouteMatch::Protected(route) => self.guarded(route, &state),
            RouteMatch::Fallback(home) => match self.guarded(home, &state) {
                Screen::Render { path } => Screen::Redirect { to: path },
                other => other,
            },
        }
    }

    fn guarded(&self, route: &'static RouteSpec, state: &SessionState) -> Screen {
        match route.guard.evaluate(state) {
            GuardState::CheckingSession => Screen::Loading,
            GuardState::DeniedNoSession => Screen::Redirect {
                to: self.config.login_path.clone(),
            },
            denied @ (GuardState::DeniedRole { .. } | GuardState::DeniedModule { .. }) => {
                Screen::AccessDenied {
                    message: denied.denial_message().unwrap_or_default(),
                }
            }
            GuardState::Granted => Screen::Render {
                path: route.path.to_string(),
            },
        }
    }

    /// Build the flight board from a flight-list response body.
    ///
    /// The `/flights` guard runs first; the body is only read when the
    /// viewer may see it.
    pub fn flight_board(&self, body: &str) -> anyhow::Result<FlightBoardView> {
        match self.open("/flights") {
            Screen::Render { .. } => {}
            screen => return Ok(FlightBoardView::Blocked { screen }),
        }

        let flights = parse_flights(body)?;
        let board = FlightBoard::from_flights(&flights);
        tracing::debug!(
            total = board.total,
            round_trips = board.round_trip_count,
            warnings = board.warnings.len(),
            "flight board projected"
        );
        Ok(FlightBoardView::Ready { board })
    }
}
