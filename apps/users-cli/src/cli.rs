use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use domain_users::{AuthenticatedUser, Role, SortDirection};

#[derive(Debug, Parser)]
#[command(name = "users-cli")]
#[command(about = "Run user commands and queries against the configured store")]
pub struct Cli {
    #[command(flatten)]
    pub principal: PrincipalArgs,

    /// Print handler metrics (Prometheus text format) to stderr when done
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Who the call is made as. Without `--as-role` the caller is an anonymous guest.
#[derive(Debug, Args)]
pub struct PrincipalArgs {
    #[arg(long = "as-id", global = true, default_value = "")]
    pub id: String,

    #[arg(long = "as-email", global = true, default_value = "")]
    pub email: String,

    /// GUEST, REGULAR, MODERATOR or ADMIN
    #[arg(long = "as-role", global = true, default_value = "GUEST")]
    pub role: Role,
}

impl PrincipalArgs {
    pub fn principal(&self) -> AuthenticatedUser {
        AuthenticatedUser::new(self.id.trim(), self.email.trim(), self.role)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new account (allowed for guests)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
    },

    /// Change a username (owner or admin)
    ChangeUsername {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        username: String,
    },

    /// Promote a regular user to moderator
    MakeModerator {
        #[arg(long)]
        user_id: String,
    },

    /// Demote a moderator to regular
    MakeRegular {
        #[arg(long)]
        user_id: String,
    },

    AwardBadge {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        badge: String,
    },

    RevokeBadge {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        badge: String,
    },

    /// Ban a user, either indefinitely or for a time window
    Ban {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        reason: String,
        #[arg(long, conflicts_with_all = ["from", "to"])]
        indefinite: bool,
        /// Start of the ban window (RFC 3339)
        #[arg(long, requires = "to")]
        from: Option<DateTime<Utc>>,
        /// End of the ban window (RFC 3339)
        #[arg(long, requires = "from")]
        to: Option<DateTime<Utc>>,
    },

    Unban {
        #[arg(long)]
        user_id: String,
    },

    GetUser {
        #[arg(long)]
        id: String,
    },

    GetUserByEmail {
        #[arg(long)]
        email: String,
    },

    /// List users by join date
    ListUsers {
        /// Page size (1-100, default 10)
        #[arg(long)]
        first: Option<u64>,
        /// `endCursor` of the previous page
        #[arg(long)]
        after: Option<String>,
        /// ASC or DESC
        #[arg(long, default_value = "DESC")]
        sort: SortDirection,
    },
}
