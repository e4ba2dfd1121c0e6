use roster::utils::errors::{ErrorCode, RosterError};

fn main() -> Result<(), RosterError> {
    tokio::runtime::Builder::new_multi_thread()
        // Cap the number of blocking threads - hashing runs there and a burst of logins
        // would otherwise spawn a thread per request.
        .max_blocking_threads(num_cpus::get())
        .enable_all()
        .build()
        .map_err(|err| ErrorCode::IOError.with_msg(&format!("Unable to start the runtime: {}", err)))?
        .block_on(async {
            roster::lib_main().await
        })
}
