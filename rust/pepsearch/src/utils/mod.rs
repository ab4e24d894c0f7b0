pub mod pool;
pub mod quick_sort;

pub use pool::ReusablePool;
pub use quick_sort::{
    QuickSorter,
    fast_f64_cmp,
};
