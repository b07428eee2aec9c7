//! Application state for the ParkDesk CLI.
//!
//! `App` owns the session manager, the router guard that follows it, and the
//! API client. Each command asks the guard whether its screen is reachable
//! before doing any work.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info, warn};

use parkdesk_core::api::{ApiClient, BookingSource, ParkingSource, ProfileSource, ReportSource};
use parkdesk_core::auth::{AuthError, SessionManager, SessionStatus};
use parkdesk_core::config::Config;
use parkdesk_core::models::{Credentials, NewArea, SignupRequest};
use parkdesk_core::routing::{authorize, NavigationStack, Navigator, Route, RouterGuard};

use crate::commands::{AreaAction, Command, ReportKind, SlotAction};
use crate::output;

pub struct App {
    config: Config,
    sessions: Arc<SessionManager>,
    api: ApiClient,
    guard: RouterGuard<NavigationStack>,
}

impl App {
    /// Build the app and resolve the session from the configured credential store.
    pub async fn new(config: Config, cache_dir: &Path) -> Result<Self> {
        debug!(?cache_dir, store = ?config.token_store, "Cache directory configured");

        let store = config.token_store.open(cache_dir);
        let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
        let sessions = Arc::new(SessionManager::new(store, Arc::new(api.clone())));
        let mut guard = RouterGuard::new(sessions.subscribe(), NavigationStack::new());

        let resolved = sessions.resolve().await;
        if let Some(diagnostic) = resolved.diagnostic {
            eprintln!("Warning: {}", diagnostic.user_message());
        }
        let decision = guard.evaluate();
        debug!(?decision, "Initial route decided");

        Ok(Self {
            config,
            sessions,
            api,
            guard,
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        if let Some(requested) = command.route() {
            let shown = authorize(&self.sessions.current(), requested.clone());
            if shown != requested {
                return Err(redirect_error(&shown));
            }
            self.enter(requested);
        }

        match command {
            Command::Status => {
                self.print_status();
                Ok(())
            }
            Command::Login { email } => self.login(email).await,
            Command::Signup => self.signup().await,
            Command::Logout => {
                self.logout().await;
                Ok(())
            }
            Command::Profile => {
                let profile = self.authed_api()?.fetch_profile().await?;
                println!("{}", output::format_profile(&profile));
                Ok(())
            }
            Command::Bookings { category } => {
                let bookings = self.authed_api()?.fetch_bookings(category).await?;
                println!("{} bookings\n", category);
                println!("{}", output::format_bookings(&bookings));
                Ok(())
            }
            Command::Areas => {
                let areas = self.authed_api()?.fetch_areas().await?;
                println!("{}", output::format_areas(&areas));
                Ok(())
            }
            Command::Slots { area_id } => {
                let slots = self.authed_api()?.fetch_slots(&area_id).await?;
                println!("{}", output::format_slots(&slots));
                Ok(())
            }
            Command::Area { action } => self.area(action).await,
            Command::ManageSlots { action } => self.manage_slots(action).await,
            Command::Report {
                kind: ReportKind::Occupancy,
            } => {
                let items = self.authed_api()?.fetch_occupancy().await?;
                println!("{}", output::format_occupancy(&items));
                Ok(())
            }
            Command::Report {
                kind: ReportKind::Revenue,
            } => {
                let items = self.authed_api()?.fetch_revenue().await?;
                println!("{}", output::format_revenue(&items));
                Ok(())
            }
        }
    }

    /// Show an allowed screen. Auth screens swap in place so none is left under the
    /// dashboard after sign-in; admin screens stack.
    fn enter(&mut self, route: Route) {
        let navigator = self.guard.navigator_mut();
        if route.requires_auth() {
            navigator.push(route);
        } else {
            navigator.replace(route);
        }
    }

    /// Screen the guard currently shows.
    pub fn current_route(&self) -> Option<&Route> {
        self.guard.navigator().current()
    }

    fn print_status(&self) {
        match self.sessions.status() {
            SessionStatus::Authenticated => println!("Signed in."),
            SessionStatus::Unauthenticated => println!("Not signed in."),
            SessionStatus::Unknown => println!("Session not resolved yet."),
        }
        if let Some(route) = self.current_route() {
            println!("Screen: {}", route);
        }
    }

    fn authed_api(&self) -> Result<ApiClient> {
        let token = self
            .sessions
            .token()
            .ok_or_else(|| redirect_error(&Route::PUBLIC_AUTH_ROOT))?;
        Ok(self.api.with_token(&token))
    }

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = match email.or_else(|| std::env::var("PARKDESK_EMAIL").ok()) {
            Some(email) => email,
            None => prompt("Email", self.config.last_email.as_deref())?,
        };
        let password = match std::env::var("PARKDESK_PASSWORD") {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ")?,
        };

        println!("\nAuthenticating...");
        self.sessions
            .sign_in(&Credentials::new(email.clone(), password))
            .await
            .map_err(auth_failure)?;
        self.guard.evaluate();

        self.config.last_email = Some(email.trim().to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!("Login successful");
        println!("Login successful!");
        Ok(())
    }

    async fn signup(&mut self) -> Result<()> {
        let name = prompt("Name", None)?;
        let email = prompt("Email", None)?;
        let password = rpassword::prompt_password("Password: ")?;

        self.sessions
            .sign_up(&SignupRequest::new(name, email, password))
            .await
            .map_err(auth_failure)?;

        // Signing up does not sign in; send the user to the login screen
        self.guard.navigator_mut().replace(Route::Login);
        println!("Account created successfully! Run `parkdesk login` to sign in.");
        Ok(())
    }

    async fn area(&mut self, action: AreaAction) -> Result<()> {
        let api = self.authed_api()?;
        match action {
            AreaAction::Add { name, location } => {
                api.create_area(&NewArea::new(name, location)).await?;
                self.guard.navigator_mut().replace(Route::ParkingAreas);
                println!("Parking area added successfully.");
            }
            AreaAction::Show { area_id } => {
                let details = api.fetch_area(&area_id).await?;
                println!("{}", output::format_area_details(&details));
            }
            AreaAction::Edit {
                area_id,
                name,
                location,
                total_slots,
            } => {
                if name.is_none() && location.is_none() && total_slots.is_none() {
                    bail!("Nothing to change. Pass --name, --location or --total-slots.");
                }
                let mut details = api.fetch_area(&area_id).await?;
                if let Some(name) = name {
                    details.area_name = name.trim().to_string();
                }
                if let Some(location) = location {
                    details.location = location.trim().to_string();
                }
                if let Some(total_slots) = total_slots {
                    details.total_slots = total_slots;
                }
                api.update_area(&area_id, &details).await?;
                self.guard.navigator_mut().back();
                println!("Area updated successfully.");
            }
        }
        Ok(())
    }

    async fn manage_slots(&mut self, action: Option<SlotAction>) -> Result<()> {
        let api = self.authed_api()?;
        let (slot_id, active) = match action {
            None => {
                let slots = api.fetch_managed_slots().await?;
                println!("{}", output::format_managed_slots(&slots));
                return Ok(());
            }
            Some(SlotAction::Enable { slot_id }) => (slot_id, true),
            Some(SlotAction::Disable { slot_id }) => (slot_id, false),
        };

        api.set_slot_active(&slot_id, active).await?;
        println!(
            "Slot {} is now {}.",
            slot_id,
            if active { "active" } else { "inactive" }
        );
        Ok(())
    }

    async fn logout(&mut self) {
        let transition = self.sessions.sign_out().await;
        self.guard.evaluate();

        if let Some(diagnostic) = transition.diagnostic {
            eprintln!(
                "Warning: signed out, but the stored token could not be removed ({})",
                diagnostic
            );
        }
        println!("Signed out.");
    }
}

fn redirect_error(shown: &Route) -> anyhow::Error {
    match shown {
        Route::Login => anyhow!("Not signed in. Run `parkdesk login` first."),
        Route::Dashboard => {
            anyhow!("Already signed in. Run `parkdesk logout` to switch accounts.")
        }
        other => anyhow!("Screen unavailable, redirected to {}", other),
    }
}

fn auth_failure(err: AuthError) -> anyhow::Error {
    let message = err.user_message();
    if err.is_retryable() {
        anyhow!("{} ({})", message, err)
    } else {
        anyhow!(message)
    }
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), default) {
        (true, Some(default)) => Ok(default.to_string()),
        (true, None) => bail!("{} is required", label),
        (false, _) => Ok(input.to_string()),
    }
}
