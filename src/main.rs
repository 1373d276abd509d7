use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use objectop::{session, FolderCopyMode, ObjectService, OperationError};
use tracing::{error, info, span, Level};

fn cli() -> Command {
    let overwrite = Arg::new("overwrite")
        .long("overwrite")
        .action(ArgAction::SetTrue)
        .help("replace the destination if it already exists");

    Command::new("objectop")
        .version(clap::crate_version!())
        .arg(
            Arg::new("BUCKET_URI")
                .required(true)
                .index(1)
                .help("s3://<bucket> or gs://<bucket>"),
        )
        .subcommand_required(true)
        .subcommand(Command::new("exists").arg(Arg::new("KEY").required(true)))
        .subcommand(
            Command::new("upload")
                .arg(Arg::new("LOCAL_PATH").required(true))
                .arg(Arg::new("KEY").required(true))
                .arg(overwrite.clone()),
        )
        .subcommand(Command::new("delete").arg(Arg::new("KEY").required(true)))
        .subcommand(
            Command::new("copy")
                .arg(Arg::new("SOURCE").required(true))
                .arg(Arg::new("DESTINATION").required(true))
                .arg(overwrite),
        )
        .subcommand(Command::new("delete-folder").arg(Arg::new("PREFIX").required(true)))
        .subcommand(
            Command::new("copy-folder")
                .arg(Arg::new("SOURCE").required(true))
                .arg(Arg::new("DESTINATION").required(true))
                .arg(
                    Arg::new("flatten")
                        .long("flatten")
                        .action(ArgAction::SetTrue)
                        .help("copy every object directly under the destination, dropping sub-paths"),
                ),
        )
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    // required args are enforced by clap
    matches.get_one::<String>(name).map(String::as_str).unwrap_or_default()
}

fn run(service: &ObjectService, command: &str, matches: &ArgMatches) -> Result<(), OperationError> {
    match command {
        "exists" => {
            let existence = service.exists(arg(matches, "KEY"))?;
            if !existence.is_present() {
                return Err(OperationError::NotFound {
                    key: arg(matches, "KEY").to_string(),
                });
            }
        }
        "upload" => service.upload_file(
            arg(matches, "LOCAL_PATH"),
            arg(matches, "KEY"),
            matches.get_flag("overwrite"),
        )?,
        "delete" => service.delete_file(arg(matches, "KEY"))?,
        "copy" => {
            service.copy_file(
                arg(matches, "SOURCE"),
                arg(matches, "DESTINATION"),
                matches.get_flag("overwrite"),
            )?;
        }
        "delete-folder" => {
            service.delete_folder(arg(matches, "PREFIX"))?;
        }
        "copy-folder" => {
            let mode = if matches.get_flag("flatten") {
                FolderCopyMode::Flatten
            } else {
                FolderCopyMode::Preserve
            };
            service.copy_folder_with(arg(matches, "SOURCE"), arg(matches, "DESTINATION"), mode)?;
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().json().init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    let matches = cli().get_matches();
    let bucket_uri = arg(&matches, "BUCKET_URI");
    info!(bucket_uri = bucket_uri, "args");

    let service = match session::from_env(bucket_uri) {
        Ok(service) => service,
        Err(err) => {
            error!(error_message = %err, error_group = "session");
            return ExitCode::FAILURE;
        }
    };

    let Some((command, sub_matches)) = matches.subcommand() else {
        return ExitCode::FAILURE;
    };

    match run(&service, command, sub_matches) {
        Ok(()) => {
            info!(command = command, "succeeded");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(command = command, error_message = %err, failure_kind = ?err.kind(), "failed");
            ExitCode::FAILURE
        }
    }
}
