//! `sk users ...`

use clap::{Args, Subcommand};

use shopkeeper_client::ApiClient;
use shopkeeper_core::{Role, UserId, UserInput, UserListParams};

use super::{CliError, ListArgs, confirm, print_deleted, print_json};

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// List users with one role
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Role filter (`user` or `admin`)
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
    /// Show one user
    Get { id: UserId },
    /// Create a user
    Create(UserArgs),
    /// Replace a user
    Update {
        id: UserId,
        #[command(flatten)]
        user: UserArgs,
    },
    /// Delete a user
    Delete {
        id: UserId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct UserArgs {
    #[arg(long)]
    fullname: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "SHOPKEEPER_USER_PASSWORD", hide_env_values = true)]
    password: String,
}

impl From<UserArgs> for UserInput {
    fn from(args: UserArgs) -> Self {
        Self {
            fullname: args.fullname,
            username: args.username,
            email: args.email,
            password: args.password,
        }
    }
}

/// Run a user command.
///
/// # Errors
///
/// Returns an error if the API call or output fails.
pub async fn run(api: &ApiClient, action: UserAction) -> Result<(), CliError> {
    match action {
        UserAction::List { list, role } => {
            let params = UserListParams {
                list: list.params(),
                role,
            };
            print_json(&api.list_users(&params).await?)
        }
        UserAction::Get { id } => print_json(&api.get_user(id).await?),
        UserAction::Create(user) => print_json(&api.create_user(&user.into()).await?),
        UserAction::Update { id, user } => print_json(&api.update_user(id, &user.into()).await?),
        UserAction::Delete { id, yes } => {
            let deleted = confirm(&format!("Delete user {id}?"), yes).await?;
            if deleted {
                api.delete_user(id).await?;
            }
            print_deleted("user", id, deleted)
        }
    }
}
