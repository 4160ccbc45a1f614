//! A binary executable that demonstrates how to use the `csonh` library.
//!
//! This is not part of the library itself, but provides a simple
//! example of parsing a document and reporting a diagnostic.
//!
//! You can run this example with: `cargo run`

use csonh::CsonhValue;

fn main() {
    let input = "\
# Deployment settings
server:
  host: 'localhost'
  port: 8080
  tls: on
pool: [{id: 1}, {id: 2}]
motd: '''
  Welcome aboard.
  Mind the gap.
  '''
";
    println!("--- Parsing a document ---");
    println!("{input}");
    match csonh::parse(input) {
        Ok(value) => {
            println!("Parsed: {value:#?}");
            let port = value
                .get("server")
                .and_then(|server| server.get("port"))
                .and_then(CsonhValue::as_i64);
            println!("server.port = {port:?}");
        }
        Err(error) => println!("{error}"),
    }

    println!("\n--- Reporting an error ---");
    let broken = "servers: [alpha beta]";
    println!("{broken}");
    match csonh::parse(broken) {
        Ok(value) => println!("Parsed: {value:?}"),
        Err(error) => println!("{error}"),
    }
}
