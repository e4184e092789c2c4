use std::path::PathBuf;

error_chain! {
    errors {
        MissingCommand {
            description("missing command")
            display("Missing command and file argument.")
        }
        MissingDestination {
            description("missing destination file")
            display("Missing file argument.")
        }
        Launch(command: String) {
            description("command could not be launched")
            display("{}", command)
        }
        Sink(path: PathBuf) {
            description("destination file failed")
            display("{}", path.display())
        }
        Channel(name: &'static str) {
            description("child output channel failed")
            display("child {}", name)
        }
    }

    foreign_links {
        Io(::std::io::Error);
    }
}
