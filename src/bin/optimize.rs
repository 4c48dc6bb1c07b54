use std::{env, sync::Arc, thread};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rocketopt::optimization::{
    ChannelObserver, DefaultOptimizationController, Function, FunctionCache, FunctionOptimizer,
    MultidirectionalSearchOptimizer, OptimizationProblem, ParallelExecutorCache,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .ok_or("usage: rocketopt_optimize <problem.yaml>")?;
    let problem = OptimizationProblem::load(&path)?;
    info!("Loaded optimization problem from {}", path);

    // Evaluation records go to stdout as JSON lines
    let (observer, records) = ChannelObserver::new();
    let printer = thread::spawn(move || {
        for record in records {
            match serde_json::to_string(&record) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize evaluation record: {}", e),
            }
        }
    });

    let function = Arc::new(problem.build()?.with_observer(Box::new(observer)));
    let start = function.current_point()?;

    let config = &problem.optimization;
    let cache: Arc<dyn FunctionCache> = Arc::new(ParallelExecutorCache::new(
        Arc::clone(&function) as Arc<dyn Function>,
        config.worker_threads(),
    )?);
    let mut optimizer = MultidirectionalSearchOptimizer::new(Arc::clone(&cache))
        .with_expansion(config.use_expansion)
        .with_coordinate_search(config.use_coordinate_search);
    let mut controller = DefaultOptimizationController::new(config.max_steps, config.min_step);

    info!("Starting from {}", start);
    let optimum = optimizer.optimize(start, &mut controller)?;
    let value = optimizer.optimum_value();

    info!("Search finished: {}", optimizer.statistics());
    info!(
        "Optimum {} with goal value {:.4} after {} evaluations",
        optimum,
        value,
        cache.evaluation_count()
    );

    let design = function.design_at(&optimum)?;
    for modifier in function.modifiers() {
        info!(
            "  {} = {:.5} {}",
            modifier.name(),
            modifier.current_value(&design)?,
            modifier.unit()
        );
    }

    drop(optimizer);
    drop(cache);
    drop(function);
    if printer.join().is_err() {
        warn!("Record printer thread panicked");
    }
    Ok(())
}
