use std::process;

use clap::Parser as ClapParser;
use vela::{Interpreter, Program, RunOutcome, StdHost, VMCreateInfo};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Compiled program to execute
    #[arg(default_value = "output.o", help = "The bytecode file to run")]
    program: String,

    /// Dump the VM state before every instruction
    #[arg(short, long, help = "Trace the VM state while running")]
    debug: bool,

    #[arg(long, help = "Operand stack slots")]
    stack_size: Option<usize>,

    #[arg(long, help = "Maximum nesting of calls and scopes")]
    recursion_limit: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.debug {
        println!("Debug mode is ON.");
    }

    let defaults = VMCreateInfo::default();
    let info = VMCreateInfo {
        stack_size: cli.stack_size.unwrap_or(defaults.stack_size),
        recursion_limit: cli.recursion_limit.unwrap_or(defaults.recursion_limit),
        ..defaults
    };

    let program = match Program::load(&cli.program) {
        Ok(program) => program,
        Err(err) => {
            println!("\nExecution error: {err}");
            process::exit(1);
        }
    };

    let mut vm = Interpreter::new(program, &info);
    vm.set_trace(cli.debug);

    let mut host = StdHost::stdio();
    match vm.run(&mut host) {
        Ok(RunOutcome::Finished) => {}
        Ok(RunOutcome::Exited(status)) => process::exit(status),
        Err(err) => {
            log::error!("execution stopped at instruction {}", vm.pc.saturating_sub(1));
            println!("\nExecution error: {err}");
            process::exit(1);
        }
    }
}
