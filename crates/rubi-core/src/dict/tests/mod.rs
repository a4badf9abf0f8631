mod reading_dict;
