mod arrays;
mod bodies;
mod fixtures;
mod forms;
mod multipart;
mod negotiation;
mod protobuf;
