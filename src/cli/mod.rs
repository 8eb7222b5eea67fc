use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the REST API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Create a staff account with a profile and an auth token
    CreateAdmin {
        username: String,

        email: String,

        #[arg(long)]
        password: String,

        /// Profile type of the account (customer or business)
        #[arg(long = "type", default_value = "business")]
        profile_type: String,
    },

    /// Print platform figures (reviews, rating, businesses, offers)
    Stats,
}
