//! Command-line harness for `heapsim`: a small driver that initializes the
//! simulated heap and exercises it, either through a fixed demo scenario
//! or a script of allocate/free commands read from stdin.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use log::{error, info};

use heapsim::check;
use heapsim::{HeapConfig, HeapManager};

#[derive(Parser)]
#[command(name = "heapsim-cli", about = "Drive a simulated boundary-tag heap")]
struct Cli {
  /// Total backing-store capacity, in bytes.
  #[arg(long, default_value_t = heapsim::config::MAX_HEAP)]
  max_heap: usize,

  /// Heap-extension granularity, in bytes.
  #[arg(long, default_value_t = heapsim::config::CHUNK)]
  chunk: usize,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a fixed scripted scenario and print heap stats at each step.
  Demo,
  /// Read `alloc <size>` / `free <tag>` commands from stdin, one per
  /// line, where `<tag>` is whatever name the matching `alloc` line was
  /// tagged with. `stats` dumps the current heap layout.
  Interactive,
}

fn main() {
  env_logger::init();
  let cli = Cli::parse();

  let config = HeapConfig {
    alignment: HeapConfig::default().alignment,
    max_heap: cli.max_heap,
    chunk: cli.chunk,
  };

  let mut heap = match HeapManager::init(config) {
    Ok(heap) => heap,
    Err(e) => {
      error!("failed to initialize heap: {e}");
      std::process::exit(1);
    }
  };
  info!("heap initialized: max_heap={} chunk={}", cli.max_heap, cli.chunk);

  match cli.command {
    Command::Demo => run_demo(&mut heap),
    Command::Interactive => run_interactive(&mut heap),
  }
}

fn print_stats(heap: &HeapManager) {
  let blocks = check::walk(heap);
  println!(
    "heap_size={} blocks={} (allocated={}, free={})",
    heap.mem().heap_size(),
    blocks.len(),
    blocks.iter().filter(|b| b.allocated).count(),
    blocks.iter().filter(|b| !b.allocated).count(),
  );
  for b in &blocks {
    println!(
      "  {:?}: size={} {}",
      b.block_ptr,
      b.size,
      if b.allocated { "allocated" } else { "free" }
    );
  }
  if let Err(violations) = check::verify_structural_invariants(heap) {
    for v in violations {
      println!("  INVARIANT VIOLATION: {v}");
    }
  }
}

/// Allocate a few differently-sized blocks, write through them, free one,
/// and show the heap reusing the freed space.
fn run_demo(heap: &mut HeapManager) {
  println!("[1] allocate 4 bytes");
  let a = heap.alloc(4).unwrap();
  print_stats(heap);

  println!("\n[2] allocate 100 bytes");
  let b = heap.alloc(100).unwrap();
  print_stats(heap);

  println!("\n[3] write through both pointers");
  unsafe {
    (a as *mut u32).write(0xDEADBEEF);
    std::ptr::write_bytes(b, 0xAB, 100);
    println!("a = 0x{:X}", (a as *mut u32).read());
  }

  println!("\n[4] free the first block");
  unsafe {
    heap.free(a);
  }
  print_stats(heap);

  println!("\n[5] allocate 2 bytes (check reuse of freed block)");
  let c = heap.alloc(2).unwrap();
  println!("reused freed block? {}", c == a);
  print_stats(heap);

  let _ = b;
}

fn run_interactive(heap: &mut HeapManager) {
  let mut tags: HashMap<String, *mut u8> = HashMap::new();
  let stdin = std::io::stdin();
  print!("> ");
  std::io::stdout().flush().ok();

  for line in stdin.lock().lines() {
    let Ok(line) = line else { break };
    let mut words = line.split_whitespace();
    match words.next() {
      Some("alloc") => {
        let (Some(tag), Some(size)) = (words.next(), words.next()) else {
          println!("usage: alloc <tag> <size>");
          continue;
        };
        match size.parse::<usize>() {
          Ok(size) => match heap.alloc(size) {
            Some(p) => {
              tags.insert(tag.to_string(), p);
              println!("{tag} -> {p:?}");
            }
            None => println!("alloc failed"),
          },
          Err(_) => println!("invalid size: {size}"),
        }
      }
      Some("free") => {
        let Some(tag) = words.next() else {
          println!("usage: free <tag>");
          continue;
        };
        match tags.remove(tag) {
          Some(p) => unsafe {
            heap.free(p);
            println!("freed {tag}");
          },
          None => println!("unknown tag: {tag}"),
        }
      }
      Some("stats") => print_stats(heap),
      Some("quit") | Some("exit") => break,
      Some(other) => println!("unknown command: {other}"),
      None => {}
    }
    print!("> ");
    std::io::stdout().flush().ok();
  }
}
