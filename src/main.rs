fn main() {
    if let Err(err) = curvefit::app::run() {
        eprintln!("{err}");
        // 999 does not fit in `ExitCode`; on Unix it is truncated by the OS.
        std::process::exit(err.exit_code());
    }
}
