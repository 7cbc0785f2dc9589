use std::io::Write;

use clap::Subcommand;
use trusted_zones_sdk::{
    NewZone, Profile, ProfilePatch, ThemeMode, TrustedZonesClientV1, TrustedZonesError, Zone,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage trusted WiFi zones
    #[command(subcommand)]
    Zones(ZonesCommand),
    /// Show or change the profile fields
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Show or change the theme preference
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Debug, Subcommand)]
pub enum ZonesCommand {
    /// List saved zones in the order they were added
    List,
    /// Save a new zone
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Change the name and location of a saved zone
    Edit {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Remove a saved zone
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    /// Update only the given fields
    Set {
        #[arg(long)]
        display_name: Option<String>,
        /// Notification message, repeat for several
        #[arg(long = "message")]
        messages: Vec<String>,
        /// Remove all notification messages
        #[arg(long, conflicts_with = "messages")]
        clear_messages: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    Show,
    /// Set the theme (dark or light)
    Set { mode: ThemeMode },
    Toggle,
}

/// One-line message for a failed command.
#[must_use]
pub fn render_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TrustedZonesError>() {
        Some(e) => e.user_message(),
        None => format!("{err:#}"),
    }
}

/// Run `command` against `client`, writing human-readable output to `out`.
///
/// # Errors
/// Store errors are returned as [`TrustedZonesError`] inside the `anyhow` error.
pub async fn execute(
    client: &dyn TrustedZonesClientV1,
    command: Command,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Zones(cmd) => zones(client, cmd, out).await,
        Command::Profile(cmd) => profile(client, cmd, out).await,
        Command::Theme(cmd) => theme(client, cmd, out).await,
    }
}

async fn zones(
    client: &dyn TrustedZonesClientV1,
    command: ZonesCommand,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        ZonesCommand::List => {
            let list = client.list_zones().await?;
            if let Some(corrupt) = &list.corrupt_state {
                writeln!(out, "warning: {corrupt}; showing no zones")?;
            }
            if list.is_empty() {
                writeln!(out, "No trusted zones saved.")?;
            }
            for zone in &list.zones {
                write_zone(out, zone)?;
            }
        }
        ZonesCommand::Add {
            name,
            latitude,
            longitude,
        } => {
            let zone = client
                .add_zone(NewZone::new(name, latitude, longitude))
                .await?;
            writeln!(out, "Trusted zone saved successfully!")?;
            write_zone(out, &zone)?;
        }
        ZonesCommand::Edit {
            id,
            name,
            latitude,
            longitude,
        } => {
            let zone = client
                .update_zone(&id, NewZone::new(name, latitude, longitude))
                .await?;
            writeln!(out, "Trusted zone updated.")?;
            write_zone(out, &zone)?;
        }
        ZonesCommand::Delete { id } => {
            if client.delete_zone(&id).await? {
                writeln!(out, "Trusted zone deleted.")?;
            } else {
                writeln!(out, "No zone with id {id}.")?;
            }
        }
    }
    Ok(())
}

async fn profile(
    client: &dyn TrustedZonesClientV1,
    command: ProfileCommand,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let profile = match command {
        ProfileCommand::Show => client.get_profile().await?,
        ProfileCommand::Set {
            display_name,
            messages,
            clear_messages,
        } => {
            let notification_messages = if clear_messages {
                Some(Vec::new())
            } else if messages.is_empty() {
                None
            } else {
                Some(messages)
            };
            client
                .patch_profile(ProfilePatch {
                    display_name,
                    notification_messages,
                })
                .await?
        }
    };
    write_profile(out, &profile)?;
    Ok(())
}

async fn theme(
    client: &dyn TrustedZonesClientV1,
    command: ThemeCommand,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mode = match command {
        ThemeCommand::Show => client.theme_mode().await,
        ThemeCommand::Set { mode } => {
            client.set_theme_mode(mode).await?;
            mode
        }
        ThemeCommand::Toggle => client.toggle_theme().await?,
    };
    writeln!(out, "{mode}")?;
    Ok(())
}

fn write_zone(out: &mut dyn Write, zone: &Zone) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}, {}",
        zone.id, zone.name, zone.latitude, zone.longitude
    )
}

fn write_profile(out: &mut dyn Write, profile: &Profile) -> std::io::Result<()> {
    writeln!(out, "display name: {}", profile.display_name)?;
    match profile.primary_message() {
        Some(message) => writeln!(out, "message: {message}"),
        None => writeln!(out, "message: (none)"),
    }
}
