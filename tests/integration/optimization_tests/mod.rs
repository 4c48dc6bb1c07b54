mod cache;
mod optimizer;
mod rocket;
