use std::time::Instant;

/// Console progress for a batch run: one line per request plus a closing
/// summary block.
pub struct BatchProgress {
    total: usize,
    passed: usize,
    failed_requests: Vec<String>,
    start_time: Instant,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            passed: 0,
            failed_requests: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn start_request(&self, request: &str) {
        println!("\n{}", "=".repeat(60));
        println!(
            "Processing {}/{}: {}",
            self.passed + self.failed_requests.len() + 1,
            self.total,
            request
        );
        println!("{}", "=".repeat(60));
    }

    pub fn complete_request(&mut self, request: &str, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed_requests.push(request.to_string());
        }
    }

    pub fn finish(&self) {
        let elapsed = self.start_time.elapsed();
        println!("\n{}", "=".repeat(60));
        println!("Batch summary:");
        println!("  Total:     {}", self.total);
        println!("  Passed:    {}", self.passed);
        println!("  Failed:    {}", self.failed_requests.len());
        println!("  Duration:  {:.2}s", elapsed.as_secs_f64());
        for request in &self.failed_requests {
            println!("  ✗ {}", request);
        }
        println!("{}", "=".repeat(60));
    }
}
