extern crate scss_eval;
extern crate docopt;
extern crate env_logger;

use docopt::Docopt;
use scss_eval::resolver::{ImportPathResolver, Resolver};

fn main() {
    env_logger::init();

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");
    static USAGE: &'static str = "
Usage:
    scss-eval resolve [-I <path>]... <identifier>
    scss-eval [-vh]

Options:
    -h, --help                   Show this message
    -v, --version                Show the version
    -I <path>, --include <path>  Directory to search for imports
    ";

    let args = Docopt::new(USAGE)
                      .and_then(|d| d.parse())
                      .unwrap_or_else(|e| e.exit());

    if args.get_bool("-v") {
        println!("{}", VERSION);
    } else if args.get_bool("resolve") {
        let identifier = args.get_str("<identifier>");
        let mut resolver = ImportPathResolver::new(args.get_vec("-I"));

        match resolver.resolve(identifier) {
            Some(source) => println!("{}", source.path.display()),
            None => {
                eprintln!("Import not found: {}", identifier);
                std::process::exit(1);
            },
        }
    }
}
