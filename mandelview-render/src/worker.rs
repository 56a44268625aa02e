use rayon::ThreadPoolBuilder;

/// One unit of render work, borrowing whatever it needs for the call.
pub type Job<'a> = Box<dyn FnOnce() + Send + 'a>;

/// Number of workers to use when nothing else is configured.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run every job to completion, returning only after all have finished.
///
/// With `degree <= 1` or a single job everything runs on the calling thread.
/// Otherwise a pool of up to `degree` threads is built for this call alone,
/// each job is spawned into it, and the pool is torn down after the join.
pub fn dispatch(degree: usize, jobs: Vec<Job<'_>>) -> crate::Result<()> {
    if degree <= 1 || jobs.len() <= 1 {
        for job in jobs {
            job();
        }
        return Ok(());
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(jobs.len().min(degree))
        .thread_name(|i| format!("render-worker-{i}"))
        .build()?;
    pool.scope(|scope| {
        for job in jobs {
            scope.spawn(move |_| job());
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn all_jobs_finish_before_return() {
        let done = AtomicUsize::new(0);
        let jobs: Vec<Job> = (0..8)
            .map(|_| {
                let done = &done;
                Box::new(move || {
                    std::thread::sleep(std::time::Duration::from_millis(2));
                    done.fetch_add(1, Ordering::SeqCst);
                }) as Job
            })
            .collect();
        dispatch(4, jobs).unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn serial_degree_runs_on_calling_thread() {
        let caller = std::thread::current().id();
        let seen = Mutex::new(Vec::new());
        let jobs: Vec<Job> = (0..3)
            .map(|_| {
                let seen = &seen;
                Box::new(move || seen.lock().unwrap().push(std::thread::current().id())) as Job
            })
            .collect();
        dispatch(1, jobs).unwrap();
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|&id| id == caller));
    }

    #[test]
    fn jobs_can_write_disjoint_borrowed_slices() {
        let mut data = vec![0u32; 12];
        let jobs: Vec<Job> = data
            .chunks_mut(4)
            .enumerate()
            .map(|(i, chunk)| {
                Box::new(move || chunk.iter_mut().for_each(|v| *v = i as u32 + 1)) as Job
            })
            .collect();
        dispatch(3, jobs).unwrap();
        assert_eq!(data, vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
    }

    #[test]
    fn no_jobs_is_fine() {
        dispatch(8, Vec::new()).unwrap();
    }
}
