/// Accuracy and confusion matrix for string labels
pub mod classification;
