//! CLI shell: stdin/stdout REPL standing in for the app's navigation root.

use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::AppContext;
use crate::bootstrap::Route;
use crate::gateway::{AccountProfile, AdminSignup, DriverSignup, ProfileUpdate, Unit};
use crate::session::UserType;
use crate::theme::{ColorOverrides, ThemeVariant};

pub const HELP: &str = "\
Commands:
  status                                   show session, theme and route
  palette                                  print the effective palette
  theme <light|dark|highContrast>          switch builtin palette
  colors <role>=<#hex> ...                 override primary/secondary/textSecondary
  colors reset                             drop color overrides
  start                                    pass the welcome screen
  profile <admin|driver>                   pick a profile before signup
  onboard                                  finish the tutorial
  login <email> <password>                 sign in
  register-admin <name> <email> <password> <phone> [branch]
  register-driver <name> <email> <password> <phone> <license>
  forgot <email>                           request a password reset
  account                                  show the signed-in account
  account set <field>=<value> ...          change name/email/phone/address
  logout                                   sign out
  reset-onboarding                         start onboarding over
  help | quit";

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Status,
    Palette,
    Theme(ThemeVariant),
    Colors(ColorOverrides),
    ResetColors,
    Start,
    Profile(UserType),
    Onboard,
    Login { email: String, password: String },
    RegisterAdmin {
        name: String,
        email: String,
        password: String,
        phone: String,
        branch: Option<String>,
    },
    RegisterDriver {
        name: String,
        email: String,
        password: String,
        phone: String,
        license: String,
    },
    Forgot(String),
    Account,
    UpdateAccount(ProfileUpdate),
    Logout,
    ResetOnboarding,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (head, args) = parts
            .split_first()
            .ok_or_else(|| "empty command".to_string())?;
        let owned = |i: usize| args[i].to_string();

        let cmd = match (*head, args.len()) {
            ("status", 0) => Self::Status,
            ("palette", 0) => Self::Palette,
            ("theme", 1) => Self::Theme(args[0].parse()?),
            ("colors", 1) if args[0] == "reset" => Self::ResetColors,
            ("colors", n) if n > 0 => Self::Colors(parse_overrides(args)?),
            ("start", 0) => Self::Start,
            ("profile", 1) => Self::Profile(args[0].parse()?),
            ("onboard", 0) => Self::Onboard,
            ("login", 2) => Self::Login {
                email: owned(0),
                password: owned(1),
            },
            ("register-admin", 4 | 5) => Self::RegisterAdmin {
                name: owned(0),
                email: owned(1),
                password: owned(2),
                phone: owned(3),
                branch: args.get(4).map(|s| s.to_string()),
            },
            ("register-driver", 5) => Self::RegisterDriver {
                name: owned(0),
                email: owned(1),
                password: owned(2),
                phone: owned(3),
                license: owned(4),
            },
            ("forgot", 1) => Self::Forgot(owned(0)),
            ("account", 0) => Self::Account,
            ("account", n) if n > 1 && args[0] == "set" => Self::UpdateAccount(parse_update(&args[1..])?),
            ("logout", 0) => Self::Logout,
            ("reset-onboarding", 0) => Self::ResetOnboarding,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            (other, _) => return Err(format!("unknown command or wrong arguments: {other}")),
        };
        Ok(cmd)
    }
}

fn parse_overrides(args: &[&str]) -> Result<ColorOverrides, String> {
    let mut overrides = ColorOverrides::default();
    for arg in args {
        let (role, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected role=#hex, got {arg}"))?;
        if !value.starts_with('#') {
            return Err(format!("color must start with #: {value}"));
        }
        overrides = match role {
            "primary" => overrides.with_primary(value),
            "secondary" => overrides.with_secondary(value),
            "textSecondary" => overrides.with_text_secondary(value),
            other => return Err(format!("role cannot be overridden: {other}")),
        };
    }
    Ok(overrides)
}

fn parse_update(args: &[&str]) -> Result<ProfileUpdate, String> {
    let mut update = ProfileUpdate::default();
    for arg in args {
        let (field, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got {arg}"))?;
        let slot = match field {
            "name" => &mut update.name,
            "email" => &mut update.email,
            "phone" => &mut update.phone,
            "address" => &mut update.address,
            other => return Err(format!("field cannot be changed: {other}")),
        };
        *slot = Some(value.to_string());
    }
    Ok(update)
}

fn render_profile(profile: &AccountProfile) -> String {
    let mut lines = vec![
        format!("id: {}", profile.id),
        format!("name: {}", profile.name),
        format!("email: {}", profile.email),
        format!("role: {}", profile.role),
    ];
    let optional = [
        ("phone", &profile.phone),
        ("company", &profile.company),
        ("license", &profile.license),
        ("license due", &profile.license_due_date),
        ("address", &profile.address),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.join("\n")
}

/// Execute one command, returning the text to print.
pub async fn execute(ctx: &AppContext, command: Command) -> String {
    match command {
        Command::Status => {
            let session = ctx.session.snapshot().await;
            let variant = ctx.theme.variant().await;
            format!(
                "phase: {}\nlogged in: {} ({})\nonboarded: {}\nuser: {}\ntheme: {} (status bar {})\nroute: {}",
                ctx.session.phase().await,
                session.is_logged_in,
                session
                    .user_profile
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "no profile".to_string()),
                session.has_completed_onboarding,
                session.user_name.as_deref().unwrap_or("-"),
                variant,
                if variant.is_dark() { "light" } else { "dark" },
                Route::for_session(&session),
            )
        }
        Command::Palette => ctx
            .theme
            .active_palette()
            .await
            .roles()
            .iter()
            .map(|(role, value)| format!("{role:>14}  {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Theme(variant) => {
            ctx.theme.set_variant(variant).await;
            format!("theme set to {variant}")
        }
        Command::Colors(overrides) => {
            ctx.theme.set_overrides(overrides).await;
            "colors updated".to_string()
        }
        Command::ResetColors => {
            ctx.theme.clear_overrides().await;
            "colors reset".to_string()
        }
        Command::Start => outcome(ctx.session.mark_onboarding_started().await, "welcome screen passed"),
        Command::Profile(kind) => outcome(ctx.session.select_profile(kind).await, "profile selected"),
        Command::Onboard => outcome(ctx.session.complete_onboarding().await, "onboarding complete"),
        Command::Login { email, password } => {
            match ctx.auth.sign_in(&email, &SecretString::from(password)).await {
                Ok(kind) => format!("signed in as {kind}"),
                Err(e) => format!("error: {e}"),
            }
        }
        Command::RegisterAdmin {
            name,
            email,
            password,
            phone,
            branch,
        } => {
            let confirmation = SecretString::from(password.clone());
            let signup = AdminSignup {
                name,
                email,
                password: SecretString::from(password),
                unit: branch.map(Unit::Branch).unwrap_or(Unit::Headquarters),
                phone,
            };
            outcome(ctx.auth.register_admin(&signup, &confirmation).await, "administrator registered")
        }
        Command::RegisterDriver {
            name,
            email,
            password,
            phone,
            license,
        } => {
            let confirmation = SecretString::from(password.clone());
            let signup = DriverSignup {
                name,
                email,
                password: SecretString::from(password),
                phone,
                license,
                license_due_date: None,
                address: None,
            };
            outcome(ctx.auth.register_driver(&signup, &confirmation).await, "driver registered")
        }
        Command::Forgot(email) => outcome(
            ctx.auth.forgot_password(&email).await,
            "if the account exists, reset instructions are on their way",
        ),
        Command::Account => match ctx.auth.fetch_profile().await {
            Ok(profile) => render_profile(&profile),
            Err(e) => format!("error: {e}"),
        },
        Command::UpdateAccount(update) => match ctx.auth.update_profile(&update).await {
            Ok(profile) => format!("account updated\n{}", render_profile(&profile)),
            Err(e) => format!("error: {e}"),
        },
        Command::Logout => {
            ctx.session.sign_out().await;
            "signed out".to_string()
        }
        Command::ResetOnboarding => {
            ctx.session.reset_onboarding().await;
            "onboarding reset".to_string()
        }
        Command::Help => HELP.to_string(),
        Command::Quit => "bye".to_string(),
    }
}

fn outcome<E: std::fmt::Display>(result: Result<(), E>, success: &str) -> String {
    match result {
        Ok(()) => success.to_string(),
        Err(e) => format!("error: {e}"),
    }
}

/// Read commands from stdin until EOF or `quit`.
pub async fn run_repl(ctx: &AppContext) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        match Command::parse(line) {
            Ok(Command::Quit) => break,
            Ok(command) => println!("{}\n", execute(ctx, command).await),
            Err(e) => println!("{e}\n"),
        }
        eprint!("> ");
    }
    Ok(())
}
