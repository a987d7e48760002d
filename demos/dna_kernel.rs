//! Pairwise mismatch kernel values for a handful of DNA fragments

use mismatch_kernel::{Alphabet, MismatchKernel, Result};

fn main() -> Result<()> {
    let alphabet = Alphabet::new("ACGT".chars())?;
    let mut engine = MismatchKernel::new(alphabet, 3, 1)?;

    let fragments = [
        "GATTACAGATTACA",
        "GATTACAGATTACC",
        "ACGTACGTACGT",
        "TTTTTTTTTT",
    ];

    println!("(k=3, m=1) mismatch kernel, raw and cosine-normalized\n");
    for x1 in &fragments {
        for x2 in &fragments {
            let raw = engine.kernel(x1, x2)?;
            let cos = engine.normalized_kernel(x1, x2)?;
            println!("{:16} x {:16} -> {:6} ({:.3})", x1, x2, raw, cos);
        }
    }

    let stats = engine.vector_cache_stats();
    println!(
        "\n{} vectors computed, {:.0}% vector cache hit rate",
        stats.size,
        stats.hit_rate() * 100.0
    );
    Ok(())
}
