//! acadi - certificate registry client
//!
//! Signs in, issues, verifies and looks up certificates through whichever
//! backend `CERT_BACKEND` selects. The session is kept in `CERT_SESSION_FILE`
//! between invocations, and each command is gated by the same route guards
//! as the corresponding dashboard view.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use acadi_certificates::app::auth_service::{LoginRequest, NonceRequest, SignatureRequest};
use acadi_certificates::domain::session::{guard, GuardOutcome, Route};
use acadi_certificates::infra::logging::init_logging;
use acadi_certificates::infra::BackendKind;
use acadi_certificates::{connect, CertificateApi, Config, Role, Session, SessionStore, Submission};

/// acadi - academic certificate registry client
#[derive(Parser, Debug)]
#[command(name = "acadi")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend to use (memory, local, remote); overrides CERT_BACKEND
    #[arg(long)]
    backend: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // === Session ===
    /// Demo e-mail login (issuers, verifiers, admins)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: String,
    },

    /// Wallet sign-in: request a nonce, then submit the signed message
    WalletLogin {
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "student")]
        role: String,
        /// Signature over the challenge message (not checked by the server)
        #[arg(long, default_value = "0x")]
        signature: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Check whether the current session may open a view
    CanOpen {
        /// Route, e.g. `issuer`, `/student`, `dashboard`
        route: String,
    },

    // === Issuer ===
    /// Issue a certificate (stored as pending)
    Issue {
        /// Certificate id; generated when omitted
        #[arg(long)]
        id: Option<String>,
        /// Student wallet address (0x + 40 hex digits)
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        degree: String,
        #[arg(long)]
        major: String,
        #[arg(long)]
        year: String,
        #[arg(long)]
        issuer: Option<String>,
    },

    /// Recent issue/verify activity
    Activity,

    // === Admin / verifier ===
    /// List certificates awaiting verification
    Pending,

    /// Mark a pending certificate verified
    Verify {
        /// Certificate id
        id: String,
    },

    // === Guest ===
    /// Look up a certificate by id or transaction
    Lookup {
        #[arg(long, conflicts_with = "tx", required_unless_present = "tx")]
        id: Option<String>,
        #[arg(long)]
        tx: Option<String>,
    },

    // === Student ===
    /// Certificates held by a wallet (defaults to the signed-in wallet)
    Mine {
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(backend) = &cli.backend {
        config.backend = backend
            .parse::<BackendKind>()
            .context("invalid --backend")?;
    }
    init_logging(config.log_format, &cli.log_level);

    let mut session = SessionStore::open(&config.session_path)?;
    let api = connect(&config)?;

    run(cli.command, api.as_ref(), &mut session).await
}

async fn run(command: Commands, api: &dyn CertificateApi, session: &mut SessionStore) -> Result<()> {
    match command {
        Commands::Login {
            email,
            password,
            role,
        } => {
            let resp = api
                .email_login(LoginRequest {
                    email: email.clone(),
                    password,
                    role: role.clone(),
                })
                .await?;
            let role = resp.role.map(Ok).unwrap_or_else(|| role.parse::<Role>())?;
            session.login(Session {
                token: resp.token,
                role,
                address: None,
                email: Some(email),
            })?;
            println!("signed in as {} ({})", role, api.backend().as_str());
        }

        Commands::WalletLogin {
            address,
            role,
            signature,
        } => {
            let nonce = api
                .request_nonce(NonceRequest {
                    address: address.clone(),
                    role: role.clone(),
                })
                .await?
                .nonce;
            let resp = api
                .verify_signature(SignatureRequest {
                    address: address.clone(),
                    role: role.clone(),
                    signature,
                    message: format!("Sign in to Acadi: {}", nonce),
                })
                .await?;
            let role = resp.role.map(Ok).unwrap_or_else(|| role.parse::<Role>())?;
            session.login(Session {
                token: resp.token,
                role,
                address: Some(address),
                email: None,
            })?;
            println!("wallet signed in as {}", role);
        }

        Commands::Logout => {
            session.logout()?;
            println!("signed out");
        }

        Commands::Whoami => match session.current() {
            Some(s) => print_json(&WhoAmI {
                role: s.role,
                address: s.address.as_deref(),
                email: s.email.as_deref(),
                backend: api.backend().as_str(),
            })?,
            None => println!("guest (not signed in)"),
        },

        Commands::CanOpen { route } => {
            let route = route.parse::<Route>().map_err(anyhow::Error::msg)?;
            match guard(session.current(), route) {
                GuardOutcome::Allow => println!("allow {}", route),
                GuardOutcome::Redirect(to) => println!("redirect {} -> {}", route, to),
            }
        }

        Commands::Issue {
            id,
            student,
            name,
            degree,
            major,
            year,
            issuer,
        } => {
            require(session, Route::Issuer)?;
            let mut submission = Submission {
                id: id.unwrap_or_default(),
                student_address: student,
                name,
                degree,
                major,
                year,
                issuer,
            };
            submission.ensure_id();
            let receipt = api.issue_certificate(submission, session.token()).await?;
            print_json(&receipt)?;
        }

        Commands::Activity => {
            require(session, Route::Issuer)?;
            print_json(&api.issuer_activity(session.token()).await?)?;
        }

        Commands::Pending => {
            require(session, Route::Verifier)?;
            print_json(&api.pending_certificates().await?)?;
        }

        Commands::Verify { id } => {
            require(session, Route::Verifier)?;
            print_json(&api.admin_verify(&id, session.token()).await?)?;
        }

        Commands::Lookup { id, tx } => {
            require(session, Route::Guest)?;
            let record = match (id, tx) {
                (Some(id), _) => api.lookup_by_id(&id).await?,
                (None, Some(tx)) => api.lookup_by_tx(&tx).await?,
                (None, None) => bail!("pass --id or --tx"),
            };
            print_json(&record)?;
        }

        Commands::Mine { address } => {
            require(session, Route::Student)?;
            let address = address.or_else(|| session.current().and_then(|s| s.address.clone()));
            print_json(&api.my_certificates(address.as_deref(), session.token()).await?)?;
        }
    }
    Ok(())
}

/// Runs the route guard for the view a command belongs to.
fn require(session: &SessionStore, route: Route) -> Result<()> {
    match guard(session.current(), route) {
        GuardOutcome::Allow => Ok(()),
        GuardOutcome::Redirect(Route::SignIn) => bail!("{} requires signing in first", route),
        GuardOutcome::Redirect(Route::ConnectWallet) => {
            bail!("{} requires a connected wallet; use `acadi wallet-login`", route)
        }
        GuardOutcome::Redirect(to) => bail!(
            "role '{}' may not open {} (redirected to {})",
            session.role(),
            route,
            to
        ),
    }
}

#[derive(Serialize)]
struct WhoAmI<'a> {
    role: Role,
    address: Option<&'a str>,
    email: Option<&'a str>,
    backend: &'static str,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
