use colored::*;

pub fn show() {
    let banner = r#"
    ██████╗ ███████╗███╗   ███╗██╗      ██████╗ ███████╗
    ██╔══██╗██╔════╝████╗ ████║██║      ██╔══██╗██╔════╝
    ██║  ██║█████╗  ██╔████╔██║██║█████╗██████╔╝███████╗
    ██║  ██║██╔══╝  ██║╚██╔╝██║██║╚════╝██╔══██╗╚════██║
    ██████╔╝███████╗██║ ╚═╝ ██║██║      ██║  ██║███████║
    ╚═════╝ ╚══════╝╚═╝     ╚═╝╚═╝      ╚═╝  ╚═╝╚══════╝
    "#;

    println!("{}", banner.bright_red());
    println!(
        "    {}",
        "Multi-protocol credential brute force tool written in Rust".bright_yellow()
    );
    println!("    {}", "For authorized security testing only".bright_yellow());
    println!(
        "    {}",
        format!("Version: {}", env!("CARGO_PKG_VERSION")).bright_yellow()
    );
    println!();
}
